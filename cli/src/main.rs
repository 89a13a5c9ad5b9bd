/*
 * This file is part of nsd.
 *
 * nsd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

mod args;
mod command;
#[macro_use]
mod error;

use {
    args::Args,
    clap::Parser,
    command::Command,
    error::CliError,
    log::{info, warn},
    nsd::{Engine, EngineConfig},
    std::{fs, sync::Arc},
};

fn run(args: Args) -> Result<(), CliError> {
    let source = fs::read_to_string(&args.input)?;
    let commands = source
        .lines()
        .enumerate()
        .filter_map(|(lineno, line)| match Command::parse_line(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("{}:{}: {e}, skipping", args.input.display(), lineno + 1);
                None
            }
        })
        .collect::<Vec<_>>();

    let config = EngineConfig::new(args.capacity, args.max_dir_entries, 40).with_strategy(args.strategy.into());
    let engine = Arc::new(Engine::new(config));

    let threads = args.threads.max(1);
    let chunk_size = commands.len().div_ceil(threads).max(1);
    let handles: Vec<_> = commands
        .chunks(chunk_size)
        .map(|chunk| {
            let engine = Arc::clone(&engine);
            let chunk = chunk.to_vec();
            std::thread::spawn(move || {
                for command in chunk {
                    dispatch(&engine, command);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }

    fs::write(&args.output, engine.print_tree())?;
    Ok(())
}

fn dispatch(engine: &Engine, command: Command) {
    let result = match command {
        Command::Create { ref path, kind } => engine.create(path, kind).map(|_| ()),
        Command::Delete { ref path } => engine.delete(path),
        Command::Lookup { ref path } => engine.lookup(path).map(|_| ()),
        Command::Move { ref src, ref dst } => engine.move_node(src, dst),
        Command::Print => {
            info!("\n{}", engine.print_tree());
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!("{e} ({})", e.name());
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        fatal!("{e}");
    }
}
