// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use sexpr_scan::context::FileContext;
use sexpr_scan::parse::{Token, Tokenizer, TokenWithPos};
use sexpr_scan::read::{ParseState, TreeBuilder, write_all};
use sexpr_scan::settings::{ErrorPolicy, Settings, DEFAULT_SETTINGS};
use sexpr_scan::value::Value;
use clap::Parser as ClapParser;
use std::io::{stdout, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Result, anyhow, bail};


fn indentstr(i: usize) -> Option<&'static str> {
    "                                                                  ".get(0..i)
}

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Build up values (default: stream tokens)
    #[clap(short, long, value_parser)]
    ast: bool,
    /// Print the values (with --ast) or tokens
    #[clap(long, value_parser)]
    print: bool,
    /// Print the structure of the values instead (with --ast)
    #[clap(long, value_parser)]
    dump: bool,
    /// Show the token position (only with --print and no --ast)
    #[clap(long, value_parser)]
    pos: bool,
    /// ignore, warn, abort, exit or delegate (with --ast)
    #[clap(long, value_parser, default_value = "warn")]
    on_error: String,
    /// Maximum nesting depth (with --ast)
    #[clap(long, value_parser)]
    max_depth: Option<usize>,
    /// Path to the input file
    #[clap(value_parser, required(true))]
    input_path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let input = std::fs::read_to_string(&args.input_path)?;

    if args.ast {

        let on_error = ErrorPolicy::try_from(args.on_error.as_str())
            .map_err(|()| anyhow!("unknown error policy {:?}", args.on_error))?;
        let settings = Settings {
            max_depth: args.max_depth.unwrap_or(DEFAULT_SETTINGS.max_depth),
            ..DEFAULT_SETTINGS.with_policy(on_error)
        };
        let mut ps: ParseState<Value> = ParseState::new(
            Arc::new(FileContext { path: args.input_path.clone() }),
            settings);
        let n = ps.scan(&input, &mut TreeBuilder)?;
        let vals = &ps.values()[0..n];
        if args.dump {
            let dumped: Vec<Value> = vals.iter().map(|v| v.dump()).collect();
            write_all(BufWriter::new(stdout()), &dumped)?;
        } else if args.print {
            write_all(BufWriter::new(stdout()), vals)?;
        }
        println!(";; count_toplevel = {n}");

    } else {

        // Walk the token stream and just do some bookkeeping and
        // optionally print the tokens.

        let mut ts = Tokenizer::new(&input);
        let mut count_toplevel = 0;
        let mut depth: usize = 0;
        while let Some(te) = ts.next() {
            let TokenWithPos(token, span) = te?;
            let indentlevel;
            match token {
                Token::Open(_) => {
                    if depth == 0 {
                        count_toplevel += 1;
                    }
                    indentlevel = depth;
                    depth += 1;
                }
                Token::Close(kind) => {
                    if depth == 0 {
                        bail!("unexpected closing character '{}' at {:?}{}",
                              kind.closing(), args.input_path, span.pos)
                    }
                    depth -= 1;
                    indentlevel = depth;
                }
                _ => {
                    indentlevel = depth;
                }
            }
            if args.print {
                let text = match token {
                    Token::Symbol | Token::Number(_) => ts.text(span).to_string(),
                    Token::String => format!("\"{}\"", ts.text(span)),
                    _ => token.to_string()
                };
                if let Some(indent) = indentstr(indentlevel) {
                    if args.pos {
                        println!("{indent}{} {text}", span.pos);
                    } else {
                        println!("{indent}{text}");
                    }
                } else {
                    bail!("lists nested too deeply at {:?}{}", args.input_path, span.pos)
                }
            }
        }
        println!(";; count_toplevel = {count_toplevel}");

    }
    Ok(())
}
