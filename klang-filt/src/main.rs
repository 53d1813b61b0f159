mod argparse;

use std::io::BufRead;

use crate::argparse::{parse_args, ArgSpec, TakesArg};
use klang_mangle::{base_name, DemangleError, Demangled, EncodingEpoch, Mangler};

fn main() {
    let argspecs = vec![
        ArgSpec::new("epoch", vec!["epoch"], vec!['e'], TakesArg::Always, true),
        ArgSpec::new(
            "name-only",
            vec!["name-only"],
            vec!['n'],
            TakesArg::Never,
            true,
        ),
        ArgSpec::new("help", vec!["help"], vec!['h'], TakesArg::Never, true),
    ];

    let (args, operands) = parse_args(&argspecs);

    let mut epoch = None;
    let mut name_only = false;
    for arg in &args {
        match arg.name {
            "epoch" => match arg.value.as_deref() {
                Some("legacy") => epoch = Some(EncodingEpoch::Legacy),
                Some("extended") => epoch = Some(EncodingEpoch::Extended),
                value => {
                    eprintln!(
                        "error: Unrecognized epoch \"{}\" (expected \"legacy\" or \"extended\")",
                        value.unwrap_or("")
                    );
                    std::process::exit(1);
                }
            },
            "name-only" => name_only = true,
            "help" => {
                print_usage();
                return;
            }
            _ => {}
        }
    }

    let mangler = Mangler::new(epoch.unwrap_or(EncodingEpoch::Extended));
    let mut status = 0;

    if operands.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            for symbol in line.split_whitespace() {
                process(&mangler, epoch, symbol, name_only, &mut status);
            }
        }
    } else {
        for symbol in &operands {
            process(&mangler, epoch, symbol, name_only, &mut status);
        }
    }

    std::process::exit(status);
}

fn print_usage() {
    println!("usage: klang-filt [-n] [-e <legacy|extended>] [symbol...]");
    println!("Demangles klang kernel symbols given as operands, or read from stdin.");
    println!("  -n, --name-only   print base names only, passing unmangled input through");
    println!("  -e, --epoch       spell decoded builtins as that epoch's host types");
}

fn process(
    mangler: &Mangler,
    epoch: Option<EncodingEpoch>,
    symbol: &str,
    name_only: bool,
    status: &mut i32,
) {
    if name_only {
        println!("{}", base_name(symbol));
        return;
    }
    match mangler.demangle(symbol) {
        Ok(demangled) => println!("{}", render(&demangled, epoch)),
        // pass non-symbol input through untouched, like a filter should
        Err(DemangleError::NotMangled) => println!("{}", symbol),
        Err(e) => {
            eprintln!("klang-filt: {}: {}", symbol, e);
            *status = 1;
        }
    }
}

fn render(demangled: &Demangled, epoch: Option<EncodingEpoch>) -> String {
    let mut out = demangled.name.clone();
    out.push('(');
    let mut sep = "";
    for (ty, quals) in demangled.types.iter().zip(&demangled.quals) {
        out.push_str(sep);
        sep = ", ";
        let ty = match epoch {
            Some(epoch) => epoch
                .materializer()
                .materialize(ty)
                .unwrap_or_else(|| ty.clone()),
            None => ty.clone(),
        };
        if quals.is_default() {
            out.push_str(&ty.to_string());
        } else {
            out.push_str(&format!("{} {}", quals, ty));
        }
    }
    out.push(')');
    out
}
