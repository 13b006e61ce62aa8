// SPDX-License-Identifier: Apache-2.0

//! Parses a gate-level netlist against a cell library and reports on it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use xlsynth_netlist::cell_library::{CellLibrary, fake_cell_library};
use xlsynth_netlist::netlist::io::parse_netlist_from_path;
use xlsynth_netlist::netlist::module::Module;
use xlsynth_netlist::netlist::parse::ParseOptions;
use xlsynth_netlist::netlist::stats::NetlistStats;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input netlist (.gv, .v, or gzipped .gz)
    netlist: PathBuf,
    /// Cell library JSON; the built-in library is used when omitted
    #[arg(long)]
    cell_library: Option<PathBuf>,
    /// Module to describe in detail
    #[arg(long)]
    module: Option<String>,
    /// Treat undeclared identifiers in connections as implicit wires
    #[arg(long, default_value_t = false)]
    allow_implicit_nets: bool,
    /// Net names to look up in the selected module
    #[arg(long = "resolve-net", requires = "module")]
    resolve_nets: Vec<String>,
    /// Print statistics as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn describe_module(module: &Module, resolve_nets: &[String]) {
    println!("module {}", module.name());
    for port in module.ports() {
        let direction = port
            .direction
            .map(|d| format!("{:?}", d).to_lowercase())
            .unwrap_or_else(|| "undirected".to_string());
        match port.range {
            Some((first, last)) => {
                println!("  port {} {} [{}:{}]", direction, port.name, first, last)
            }
            None => println!("  port {} {}", direction, port.name),
        }
    }
    for cell in module.cells() {
        let bindings: Vec<String> = cell
            .bindings()
            .iter()
            .map(|(pin, net)| format!(".{}({})", pin, module.net(*net).name()))
            .collect();
        println!(
            "  cell {} {} {}",
            cell.cell_library_entry().type_name(),
            cell.name(),
            bindings.join(" ")
        );
    }
    for name in resolve_nets {
        match module.resolve_net(name) {
            Ok(net) => println!("  net {}: {:?}", name, module.net(net).origin()),
            Err(e) => println!("  {}", e),
        }
    }
}

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();

    let library = match &args.cell_library {
        Some(path) => CellLibrary::load_from_path(path)?,
        None => fake_cell_library(),
    };
    let options = ParseOptions {
        allow_implicit_nets: args.allow_implicit_nets,
    };
    let netlist = parse_netlist_from_path(&args.netlist, &library, options)?;

    let stats = NetlistStats::from_netlist(&netlist);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Modules: {}", stats.num_modules);
        println!("Instances: {}", stats.num_instances);
        println!("Nets: {}", stats.num_nets);
        println!("Constant nets: {}", stats.num_constant_nets);
        println!("Cell counts:");
        for (name, count) in &stats.cell_counts {
            println!("  {:>8} {}", count, name);
        }
    }

    if let Some(name) = &args.module {
        let module = netlist
            .get_module(name)
            .with_context(|| format!("in netlist '{}'", args.netlist.display()))?;
        describe_module(module, &args.resolve_nets);
    }
    Ok(())
}
