// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::unbounded;
use embersql_rust::{
    init_logging, AttributeValue, EmberError, EmberResult, Engine, EngineConfig, FlatConfig,
    PropertySource,
};

#[derive(Parser, Debug)]
#[command(name = "embersql", about = "EmberSQL lock and spatial function runner")]
struct Cli {
    /// Configuration file (TOML or YAML). Defaults to the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override a configuration property, e.g. `--set lock.wait-slice-ms=20`.
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a hex-encoded WKB value and print it.
    Decode {
        hex: String,
        #[arg(long, default_value_t = 0)]
        srid: i64,
        /// e.g. `axis-order=long-lat`
        #[arg(long)]
        axis_order: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Wkt)]
        format: OutputFormat,
    },
    /// Two sessions contend for one named lock.
    LockDemo {
        #[arg(long, default_value = "demo")]
        name: String,
        /// GET_LOCK timeout, in seconds, used by the waiting session.
        #[arg(long, default_value_t = 5)]
        timeout: i64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Wkt,
    Geojson,
}

fn parse_overrides(raw: &[String]) -> EmberResult<FlatConfig> {
    let mut flat = FlatConfig::new();
    for entry in raw {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            EmberError::configuration(format!("--set expects KEY=VALUE, got '{entry}'"))
        })?;
        flat.set(key.trim(), value.trim(), PropertySource::CommandLine);
    }
    Ok(flat)
}

fn load_config(cli: &Cli) -> EmberResult<EngineConfig> {
    let overrides = parse_overrides(&cli.overrides)?;
    let path = cli
        .config
        .clone()
        .or_else(|| EngineConfig::default_path().filter(|p| p.exists()));
    EngineConfig::load(path.as_deref(), &overrides)
}

fn decode(
    engine: &Engine,
    hex_input: &str,
    srid: i64,
    axis_order: Option<String>,
    format: OutputFormat,
) -> EmberResult<String> {
    let blob = hex::decode(hex_input.trim())
        .map_err(|e| EmberError::invalid_argument("decode", format!("bad hex input: {e}")))?;
    let ctx = engine.open_session();

    let mut args = vec![AttributeValue::Bytes(blob), AttributeValue::Long(srid)];
    if let Some(options) = axis_order {
        args.push(AttributeValue::String(options));
    }
    let geom = engine.evaluate(&ctx, "st_geomfromwkb", args)?;
    let rendered = match format {
        OutputFormat::Wkt => engine.evaluate(&ctx, "st_aswkt", vec![geom])?,
        OutputFormat::Geojson => engine.evaluate(&ctx, "st_asgeojson", vec![geom])?,
    };
    engine.close_session(&ctx)?;
    Ok(rendered.to_string())
}

enum DemoEvent {
    Waiting(u32),
    Acquired(u32, AttributeValue),
}

fn lock_demo(engine: Arc<Engine>, name: String, timeout: i64) -> EmberResult<()> {
    let holder = engine.open_session();
    let got = engine.evaluate(
        &holder,
        "get_lock",
        vec![AttributeValue::from(name.as_str()), AttributeValue::Long(0)],
    )?;
    println!("session {} GET_LOCK('{}', 0) = {}", holder.session_id(), name, got);

    let (tx, rx) = unbounded();
    let waiter_engine = Arc::clone(&engine);
    let waiter_name = name.clone();
    let waiter = thread::spawn(move || -> EmberResult<()> {
        let ctx = waiter_engine.open_session();
        // a send only fails once the receiver is gone, and then nobody is listening
        let _ = tx.send(DemoEvent::Waiting(ctx.session_id()));
        let result = waiter_engine.evaluate(
            &ctx,
            "get_lock",
            vec![AttributeValue::from(waiter_name.as_str()), AttributeValue::Long(timeout)],
        )?;
        let _ = tx.send(DemoEvent::Acquired(ctx.session_id(), result));
        waiter_engine.close_session(&ctx)?;
        Ok(())
    });

    for event in rx.iter() {
        match event {
            DemoEvent::Waiting(session) => {
                println!("session {session} waiting for '{name}'");
                let owner = engine.evaluate(&holder, "is_used_lock", vec![name.as_str().into()])?;
                println!("IS_USED_LOCK('{name}') = {owner}");
                thread::sleep(Duration::from_millis(50));
                let released =
                    engine.evaluate(&holder, "release_lock", vec![name.as_str().into()])?;
                println!("session {} RELEASE_LOCK('{}') = {}", holder.session_id(), name, released);
            }
            DemoEvent::Acquired(session, result) => {
                println!("session {session} GET_LOCK('{name}', {timeout}) = {result}");
            }
        }
    }

    waiter
        .join()
        .map_err(|_| EmberError::runtime("lock demo waiter panicked"))??;
    engine.close_session(&holder)?;
    Ok(())
}

fn run(cli: Cli) -> EmberResult<()> {
    let config = load_config(&cli)?;
    init_logging(&config.logging);
    let engine = Arc::new(Engine::new(config));

    match cli.command {
        Command::Decode {
            hex,
            srid,
            axis_order,
            format,
        } => {
            println!("{}", decode(&engine, &hex, srid, axis_order, format)?);
            Ok(())
        }
        Command::LockDemo { name, timeout } => lock_demo(engine, name, timeout),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
