// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use sexpr_plus::debug::dump_all;
use sexpr_plus::decode::decode_all;
use sexpr_plus::grammar::Grammar;
use sexpr_plus::read::{read_file, read_named, write_all};
use sexpr_plus::settings::{Settings, DEFAULT_SETTINGS};
use clap::Parser as ClapParser;
use std::io::{stdin, stdout, BufWriter};
use std::path::PathBuf;
use anyhow::{Result, bail};


#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Read the forms one at a time instead of all at once
    #[clap(short, long, value_parser)]
    lazy: bool,
    /// Print the forms read
    #[clap(long, value_parser)]
    print: bool,
    /// Print an outline of the forms with their spans
    #[clap(short, long, value_parser)]
    dump: bool,
    /// Treat a `#!` first line as an atom
    #[clap(long, value_parser)]
    no_shebang: bool,
    /// Maximum nesting depth (0: unlimited)
    #[clap(long, value_parser, default_value_t = 500)]
    max_depth: u32,
    /// Path to the input file, `-` for stdin
    #[clap(value_parser, required(true))]
    input_path: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings {
        allow_shebang: !args.no_shebang,
        depth_fuel: if args.max_depth == 0 { None } else { Some(args.max_depth) },
    };

    if !args.lazy && settings == DEFAULT_SETTINGS {

        // Slurp in the whole file contents as a list of trees, then
        // optionally print those.

        let doc = if args.input_path.as_os_str() == "-" {
            read_named("stdin", stdin().lock())?
        } else {
            read_file(&args.input_path)?
        };
        if args.print {
            write_all(BufWriter::new(stdout()), &doc.forms)?;
        }
        if args.dump {
            print!("{}", dump_all(&doc.forms, &doc.source));
        }
        println!(";; count_toplevel = {}", doc.forms.len());

    } else {

        // Go through the forms one by one, stopping at the first
        // error.

        let source = if args.input_path.as_os_str() == "-" {
            decode_all(stdin().lock())?
        } else {
            decode_all(std::fs::File::open(&args.input_path)?)?
        };
        let grammar = Grammar::with_settings(settings);
        let mut count_toplevel = 0;
        for form in grammar.forms(&source) {
            let form = match form {
                Ok(form) => form,
                Err(e) => bail!("{} in {:?}", e, args.input_path),
            };
            count_toplevel += 1;
            if args.print {
                println!("{form}");
            }
            if args.dump {
                print!("{}", form.dump(&source));
            }
        }
        println!(";; count_toplevel = {count_toplevel}");

    }
    Ok(())
}
