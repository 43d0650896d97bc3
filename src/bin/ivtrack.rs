use std::path::PathBuf;

use clap::{arg, value_parser, Command};
use log::{debug, info};

use ivtrack::records::Summary;
use ivtrack::{calendar, Collector, Config, TwsGateway};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = Command::new("ivtrack")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Collects year-to-date implied volatility of out-of-the-money puts")
        .arg(arg!(--address <ADDRESS> "address of TWS or IB Gateway, e.g. 127.0.0.1:7497"))
        .arg(arg!(--"client-id" <ID> "client id of the connection").value_parser(value_parser!(i32)))
        .arg(arg!(--symbol <SYMBOL> "underlying stock symbol"))
        .arg(arg!(--"weeks-out" <WEEKS> "weekly expiries between trading day and option").value_parser(value_parser!(u32)))
        .arg(arg!(--"output-dir" <DIR> "directory csv snapshots are written to").value_parser(value_parser!(PathBuf)))
        .get_matches();

    let mut config = Config::from_env()?;

    if let Some(address) = matches.get_one::<String>("address") {
        config.address = address.clone();
    }
    if let Some(client_id) = matches.get_one::<i32>("client-id") {
        config.client_id = *client_id;
    }
    if let Some(symbol) = matches.get_one::<String>("symbol") {
        config.symbol = symbol.to_uppercase();
    }
    if let Some(weeks_out) = matches.get_one::<u32>("weeks-out") {
        config.weeks_out = *weeks_out;
    }
    if let Some(output_dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output_dir = output_dir.clone();
    }

    config.validate()?;
    debug!("config: {config:?}");

    println!("{} YTD Historical Volatility Data Collector", config.symbol);
    println!("{}", "=".repeat(50));

    let gateway = TwsGateway::connect(&config)?;

    let symbol = config.symbol.clone();
    let final_file = config.final_file();

    let collector = Collector::new(gateway, config);
    let records = collector.run_and_save(calendar::today_in_exchange())?;

    match Summary::from_records(&symbol, &records) {
        Some(summary) => {
            println!("\nData collection completed! {} records saved to {}.", records.len(), final_file.display());
            println!("\nData Summary:\n{summary}");
        }
        None => println!("No data collected"),
    }

    info!("disconnecting from gateway");

    Ok(())
}
