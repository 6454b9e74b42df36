mod cli;
mod common;
mod config;
mod error;
mod library;
mod logging;
mod utils;

use cli::Cmd;
use config::{Config, NewEntry};
use error::Result;

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;

#[mutants::skip] // Cannot test directly at the moment
fn main() -> Result<()> {
    CompleteEnv::with_factory(|| Cmd::command().name("touchgrass"))
        .completer("touchgrass")
        .complete();

    logging::init();

    let mut config = Config::new()?;
    let mut stdout = std::io::stdout().lock();

    let res = match Cmd::parse() {
        Cmd::Add {
            path,
            title,
            protocol,
            cover,
            tags,
        } => config.add_entry(
            &mut stdout,
            NewEntry {
                path,
                title,
                protocol,
                cover,
                tags,
            },
        ),
        Cmd::List { json, search } => {
            config.print(&mut stdout, search.as_deref(), json)
        }
        Cmd::Show { entry, json } => config.show(&mut stdout, &entry, json),
        Cmd::Launch { entry } => config.launch(&entry),
        Cmd::Rename { entry, title } => config.rename(&entry, &title),
        Cmd::SetCover { entry, image } => config.set_cover(&entry, &image),
        Cmd::Remove { entry } => config.remove(&entry),
        Cmd::Clear { yes } => config.clear(yes),
    };

    config.drain_events();

    // Issue a notification if touchgrass is not being run in a terminal
    if let Err(ref e) = res {
        if !config.terminal_output {
            utils::notify("touchgrass error", &e.to_string())?
        }
    }

    res
}
