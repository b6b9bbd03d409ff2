// Sparkly Data Engine - Main executable
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgGroup, ArgMatches, Command};
use log::{info, warn};

use sparkly_data_engine::{
    api::Server,
    data::{read_file, to_csv_string},
    processing::{remove_null_rows, split_column, summarize, AggregateFunction, GroupByProcessor},
    storage::{open_storage, DataStorage, DatasetPatch},
    utils::{init_logging, Config},
};

fn cli() -> Command<'static> {
    Command::new("Sparkly Data Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("An in-memory tabular dataset engine")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("server")
                .about("Run the API server")
                .arg(
                    Arg::new("host")
                        .short('H')
                        .long("host")
                        .value_name("HOST")
                        .help("Sets the server host")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Sets the server port")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a CSV or JSON file as a new dataset")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("Dataset name (defaults to the file name)")
                        .takes_value(true),
                ),
        )
        .subcommand(Command::new("list").about("List stored datasets"))
        .subcommand(
            Command::new("summary")
                .about("Print summary statistics for every column")
                .arg(Arg::new("id").value_name("ID").required(true)),
        )
        .subcommand(
            Command::new("aggregate")
                .about("Group a dataset by one column and aggregate another")
                .arg(Arg::new("id").value_name("ID").required(true))
                .arg(
                    Arg::new("group")
                        .short('g')
                        .long("group")
                        .value_name("COLUMN")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("value")
                        .short('v')
                        .long("value")
                        .value_name("COLUMN")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("function")
                        .short('f')
                        .long("function")
                        .value_name("FUNCTION")
                        .help("count, sum, avg, min or max")
                        .default_value("sum")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("top")
                        .short('t')
                        .long("top")
                        .value_name("N")
                        .help("Keep only the N largest groups")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Apply a cleaning transform and save the result")
                .arg(Arg::new("id").value_name("ID").required(true))
                .arg(
                    Arg::new("remove-null-rows")
                        .long("remove-null-rows")
                        .help("Remove rows whose values are all empty"),
                )
                .arg(
                    Arg::new("split")
                        .long("split")
                        .value_name("COLUMN")
                        .help("Split a column on a delimiter")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("delimiter")
                        .short('d')
                        .long("delimiter")
                        .value_name("DELIMITER")
                        .requires("split")
                        .takes_value(true),
                )
                .group(
                    ArgGroup::new("transform")
                        .args(&["remove-null-rows", "split"])
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a dataset as CSV")
                .arg(Arg::new("id").value_name("ID").required(true))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write to a file instead of stdout")
                        .takes_value(true),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Initialize logging
    init_logging(
        config.log_level_filter(),
        config.logging.file.as_deref().map(Path::new),
    )?;

    let storage = open_storage(&config.storage).context("Failed to open storage")?;

    match matches.subcommand() {
        Some(("server", args)) => run_server(&config, storage, args),
        Some(("import", args)) => import(storage.as_ref(), args),
        Some(("list", _)) => list(storage.as_ref()),
        Some(("summary", args)) => summary(storage.as_ref(), args),
        Some(("aggregate", args)) => aggregate(&config, storage.as_ref(), args),
        Some(("clean", args)) => clean(&config, storage.as_ref(), args),
        Some(("export", args)) => export(storage.as_ref(), args),
        _ => bail!("No subcommand specified. Use --help for usage information."),
    }
}

/// Look up a required argument
fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.value_of(name)
        .with_context(|| format!("Missing argument '{}'", name))
}

fn run_server(config: &Config, storage: Arc<dyn DataStorage>, args: &ArgMatches) -> Result<()> {
    if config.storage.kind == "remote" {
        bail!("The server cannot use remote storage; configure memory, file or cache storage");
    }
    if config.storage.kind == "memory" {
        warn!("Using memory storage; datasets are lost when the server stops");
    }

    // Override config with command line arguments
    let mut server_config = config.server.clone();
    if let Some(host) = args.value_of("host") {
        server_config.host = host.to_string();
    }
    if let Some(port) = args.value_of("port") {
        server_config.port = port.parse().with_context(|| format!("Invalid port '{}'", port))?;
    }

    let server = Server::new(storage, server_config, config.data.clone());
    actix_web::rt::System::new()
        .block_on(server.run())
        .context("Server failed")
}

fn import(storage: &dyn DataStorage, args: &ArgMatches) -> Result<()> {
    let file = required(args, "file")?;
    let path = Path::new(file);

    let name = match args.value_of("name") {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file)
            .to_string(),
    };

    let parsed = read_file(path).with_context(|| format!("Failed to import {}", file))?;
    let dataset = storage.create(&parsed.into_dataset(&name))?;

    info!("Imported {} as dataset {}", file, dataset.id);
    println!(
        "{}\t{}\t{} rows\t{} columns",
        dataset.id,
        dataset.name,
        dataset.row_count,
        dataset.columns.len()
    );

    Ok(())
}

fn list(storage: &dyn DataStorage) -> Result<()> {
    for dataset in storage.list()? {
        println!(
            "{}\t{}\t{} rows\t{} columns{}",
            dataset.id,
            dataset.name,
            dataset.row_count,
            dataset.columns.len(),
            if dataset.cleaned { "\tcleaned" } else { "" }
        );
    }

    Ok(())
}

fn summary(storage: &dyn DataStorage, args: &ArgMatches) -> Result<()> {
    let dataset = storage.get(required(args, "id")?)?;

    println!("{}", serde_json::to_string_pretty(&summarize(&dataset))?);
    Ok(())
}

fn aggregate(config: &Config, storage: &dyn DataStorage, args: &ArgMatches) -> Result<()> {
    let dataset = storage.get(required(args, "id")?)?;
    let function: AggregateFunction = required(args, "function")?.parse()?;
    let top = match args.value_of("top") {
        Some(top) => top.parse().with_context(|| format!("Invalid count '{}'", top))?,
        None => config.data.chart_top_n,
    };

    let processor = GroupByProcessor::new(required(args, "group")?, required(args, "value")?, function).limit(top);

    println!("{}\t{}", required(args, "group")?, processor.output_column());
    for group in processor.aggregate(&dataset)? {
        println!("{}\t{}", group.group, group.value);
    }

    Ok(())
}

fn clean(config: &Config, storage: &dyn DataStorage, args: &ArgMatches) -> Result<()> {
    let id = required(args, "id")?;
    let dataset = storage.get(id)?;

    let snapshot = if args.is_present("remove-null-rows") {
        let removal = remove_null_rows(&dataset);
        println!("Removed {} rows", removal.rows_removed);
        removal.dataset
    } else {
        let column = required(args, "split")?;
        let delimiter = args.value_of("delimiter").unwrap_or(config.data.split_delimiter.as_str());
        let split = split_column(&dataset, column, delimiter)?;
        println!("Added columns: {}", split.new_columns.join(", "));
        split.dataset
    };

    let updated = storage.update(id, &DatasetPatch::from_snapshot(&snapshot))?;
    info!("Saved cleaned dataset {} ({} rows)", updated.id, updated.row_count);

    Ok(())
}

fn export(storage: &dyn DataStorage, args: &ArgMatches) -> Result<()> {
    let dataset = storage.get(required(args, "id")?)?;
    let csv = to_csv_string(&dataset)?;

    match args.value_of("output") {
        Some(output) => {
            fs::write(output, csv).with_context(|| format!("Failed to write {}", output))?;
            info!("Exported dataset {} to {}", dataset.id, output);
        }
        None => println!("{}", csv),
    }

    Ok(())
}
