//! tarot-draw: draw cards from the terminal.
//!
//! ```text
//! tarot-draw                 # one card
//! tarot-draw -n 3            # three cards, numbered
//! tarot-draw -s cross        # Celtic Cross
//! tarot-draw -s three --seed 7
//! ```

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use arcana_relay::tarot::{DrawEngine, Spread};

struct CliArgs {
    count: usize,
    spread: String,
    seed: Option<u64>,
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("run with --help for usage");
            std::process::exit(2);
        }
    };

    let spread: Spread = match args.spread.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let engine = DrawEngine::new();
    let cards = match engine.draw_layout(spread, args.count, &mut *rng) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    for c in cards {
        match spread {
            Spread::Single => println!("{}", c.card),
            _ => println!("{}: {}", c.position, c.card),
        }
        println!("  {}\n", c.meaning);
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs { count: 1, spread: "single".to_string(), seed: None };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-n" | "--count" => {
                let v = iter.next().ok_or("-n/--count requires a number")?;
                args.count = v.parse().map_err(|_| format!("invalid count '{v}'"))?;
            }
            "-s" | "--spread" => {
                args.spread = iter.next().ok_or("-s/--spread requires a name")?;
            }
            "--seed" => {
                let v = iter.next().ok_or("--seed requires a number")?;
                args.seed = Some(v.parse().map_err(|_| format!("invalid seed '{v}'"))?);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(args)
}

fn print_usage() {
    println!("Usage: tarot-draw [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -n, --count <N>       Number of cards for the single spread (default: 1)");
    println!("  -s, --spread <NAME>   single | three | cross (default: single)");
    println!("      --seed <U64>      Seed the shuffle for a reproducible draw");
    println!("  -h, --help            Print help");
}
