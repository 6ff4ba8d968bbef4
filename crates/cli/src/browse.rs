//! Line-oriented browse session on top of the debounced filter loop.

use std::sync::Arc;

use anyhow::{bail, Result};
use kadi_core::WeaponLite;
use kadi_search::{spawn_filter_loop, DebounceConfig, FacetKey, FilterEngine, FilterEvent, FilterView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

use crate::parse;
use crate::Output;

pub const HELP: &str = "\
commands:
  q TEXT            name query (empty clears)
  set FACET VALUES  e.g. `set category pulse_rifle,hand_cannon`, `set stats range>40`
  clear FACET
  sort STAT[:asc|desc] | sort off
  group FACET | group off
  help
  quit";

#[derive(Debug)]
pub enum Command {
    Event(FilterEvent),
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).map(|(v, r)| (v, r.trim())).unwrap_or((line, ""));
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "q" | "query" => Command::Event(FilterEvent::Query(rest.to_string())),
        "set" => {
            let Some((facet, values)) = rest.split_once(char::is_whitespace) else {
                bail!("usage: set FACET VALUES");
            };
            let key: FacetKey = facet.parse()?;
            Command::Event(FilterEvent::Facet(key, parse::selection(key, &[values])?))
        }
        "clear" => {
            let key: FacetKey = rest.parse()?;
            Command::Event(FilterEvent::Facet(key, parse::cleared(key)))
        }
        "sort" => match rest {
            "" | "off" => Command::Event(FilterEvent::Sort(None)),
            arg => Command::Event(FilterEvent::Sort(Some(parse::sort(arg)?))),
        },
        "group" => match rest {
            "" | "off" => Command::Event(FilterEvent::GroupBy(None)),
            facet => Command::Event(FilterEvent::GroupBy(Some(facet.parse()?))),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}; try `help`"),
    };
    Ok(Some(cmd))
}

pub async fn run(weapons: Vec<WeaponLite>, engine_cfg: impl FnOnce(FilterEngine) -> FilterEngine, limit: usize, output: Output) -> Result<()> {
    let engine = engine_cfg(FilterEngine::new(weapons).with_default_facets());
    let (tx, handle) = spawn_filter_loop(engine, DebounceConfig::from_env());
    info!(weapons = handle.weapons().len(), "browse session started");

    let printer = tokio::spawn({
        let handle = handle.clone();
        async move {
            let mut epochs = handle.subscribe_epoch();
            while epochs.changed().await.is_ok() {
                print_view(&handle.current(), handle.weapons(), limit, output);
            }
        }
    });

    print_view(&handle.current(), handle.weapons(), limit, output);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Some(Command::Event(ev))) => {
                        if tx.send(ev).await.is_err() {
                            warn!("filter loop stopped; ending session");
                            break;
                        }
                    }
                    Ok(Some(Command::Help)) => eprintln!("{HELP}"),
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Ctrl-C received; ending browse session");
                break;
            }
        }
    }

    // closing the sender flushes pending events and publishes a last view
    drop(tx);
    let _ = printer.await;
    Ok(())
}

fn print_view(view: &FilterView, weapons: &Arc<Vec<WeaponLite>>, limit: usize, output: Output) {
    match output {
        Output::Json => match serde_json::to_string(view) {
            Ok(s) => println!("{s}"),
            Err(e) => warn!(error = %e, "failed to encode view"),
        },
        Output::Human => {
            let active: Vec<&str> = view.active.iter().map(|k| k.as_str()).collect();
            println!("-- epoch {} | {} hits | active: [{}]", view.epoch, view.hits.len(), active.join(", "));
            match &view.groups {
                Some(groups) => {
                    for g in groups {
                        println!("  {} ({})", g.label, g.hits.len());
                        for d in g.hits.iter().take(limit) {
                            println!("    {}", weapons[*d].name);
                        }
                    }
                }
                None => {
                    for d in view.hits.iter().take(limit) {
                        println!("  {:<12} {}", weapons[*d].hash, weapons[*d].name);
                    }
                }
            }
        }
    }
}
