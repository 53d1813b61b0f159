#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TakesArg {
    Always,
    Never,
}

#[derive(Clone, Debug, Hash)]
pub struct ArgSpec {
    name: &'static str,
    long: Vec<&'static str>,
    short: Vec<char>,
    takes_arg: TakesArg,
    once: bool,
}

impl ArgSpec {
    pub fn new(
        name: &'static str,
        long: Vec<&'static str>,
        short: Vec<char>,
        takes_arg: TakesArg,
        once: bool,
    ) -> Self {
        Self {
            name,
            long,
            short,
            takes_arg,
            once,
        }
    }
}

#[derive(Clone, Debug, Hash)]
pub struct Arg {
    pub name: &'static str,
    pub value: Option<String>,
}

fn push_arg(result: &mut Vec<Arg>, spec: &ArgSpec, value: Option<String>) {
    if spec.once {
        result.retain(|arg| arg.name != spec.name);
    }
    result.push(Arg {
        name: spec.name,
        value,
    });
}

pub fn parse_args(argspecs: &[ArgSpec]) -> (Vec<Arg>, Vec<String>) {
    let mut result = Vec::new();
    let mut operands = Vec::new();
    let mut args = std::env::args();
    let _ = args.next();
    while let Some(arg) = args.next() {
        if arg == "--" {
            operands.extend(args);
            break;
        }
        if arg.starts_with('-') && arg != "-" {
            if let Some(arg) = arg.strip_prefix("--") {
                let (name, inline) = match arg.split_once('=') {
                    Some((name, value)) => (name, Some(String::from(value))),
                    None => (arg, None),
                };
                let Some(spec) = argspecs.iter().find(|spec| spec.long.contains(&name)) else {
                    eprintln!("error: Unrecognized long option \"--{}\"", name);
                    std::process::exit(1);
                };
                match spec.takes_arg {
                    TakesArg::Always => {
                        let value = match inline {
                            Some(value) => value,
                            None => match args.next() {
                                Some(next) => next,
                                None => {
                                    eprintln!(
                                        "error: Got long option \"--{}\" without required parameter",
                                        name
                                    );
                                    std::process::exit(1);
                                }
                            },
                        };
                        push_arg(&mut result, spec, Some(value));
                    }
                    TakesArg::Never => {
                        if inline.is_some() {
                            eprintln!(
                                "error: Long option \"--{}\" does not take a parameter",
                                name
                            );
                            std::process::exit(1);
                        }
                        push_arg(&mut result, spec, None);
                    }
                }
            } else {
                let mut chars = arg.chars().skip(1);
                while let Some(opt) = chars.next() {
                    let Some(spec) = argspecs.iter().find(|spec| spec.short.contains(&opt)) else {
                        eprintln!("error: Unrecognized short option \"-{}\"", opt);
                        std::process::exit(1);
                    };
                    match spec.takes_arg {
                        TakesArg::Always => {
                            let remainder: String = chars.by_ref().collect();
                            let value = if remainder.is_empty() {
                                match args.next() {
                                    Some(next) => next,
                                    None => {
                                        eprintln!(
                                            "error: Got short option \"-{}\" without required parameter",
                                            opt
                                        );
                                        std::process::exit(1);
                                    }
                                }
                            } else {
                                remainder
                            };
                            push_arg(&mut result, spec, Some(value));
                            break;
                        }
                        TakesArg::Never => push_arg(&mut result, spec, None),
                    }
                }
            }
        } else {
            operands.push(arg);
        }
    }
    (result, operands)
}
