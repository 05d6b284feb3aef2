// src/engine.rs
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context};
use clap::{Args, Subcommand};
use log::{debug, info};
use sha1::{Digest, Sha1};

use crate::bencode::{bvalue_to_json, encode, encode_bvalue, BValue, Decoder};
use crate::config::Config;

#[derive(Debug, Args)]
pub struct Input {
    /// Bencoded (or JSON, for `encode`) text, or a path with --file. `-` reads stdin.
    pub input: String,

    /// Treat INPUT as a file path
    #[arg(short, long)]
    pub file: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode bencode and print it as JSON
    Decode {
        #[command(flatten)]
        input: Input,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// Encode a JSON document as bencode (raw bytes on stdout)
    Encode {
        #[command(flatten)]
        input: Input,
    },
    /// Print the SHA-1 of a value's encoding, e.g. a torrent's info hash
    Hash {
        #[command(flatten)]
        input: Input,

        /// Hash only this key of the top-level dictionary
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Validate bencode and report whether it is canonical
    Check {
        #[command(flatten)]
        input: Input,
    },
}

pub fn use_command(command: &Command, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let decoder = Decoder::new(config.decode_options());

    match command {
        Command::Decode { input, pretty } => {
            let data = read_input(input)?;
            let value = decoder.decode(&data).context("decoding input")?;
            let json_val = bvalue_to_json(&value);
            if *pretty || config.pretty {
                writeln!(out, "{}", serde_json::to_string_pretty(&json_val)?)?;
            } else {
                writeln!(out, "{}", serde_json::to_string(&json_val)?)?;
            }
        }
        Command::Encode { input } => {
            let data = read_input(input)?;
            let doc: serde_json::Value =
                serde_json::from_slice(&data).context("input is not valid JSON")?;
            let encoded = encode(&doc).context("encoding input")?;
            debug!("encoded {} bytes", encoded.len());
            out.write_all(&encoded)?;
        }
        Command::Hash { input, key } => {
            let data = read_input(input)?;
            let value = decoder.decode(&data).context("decoding input")?;
            let target: &BValue = match key {
                Some(k) => value
                    .get(k.as_bytes())
                    .ok_or_else(|| anyhow!("top-level dictionary has no key '{}'", k))?,
                None => &value,
            };

            let mut hasher = Sha1::new();
            hasher.update(encode_bvalue(target));
            writeln!(out, "{}", hex::encode(hasher.finalize()))?;
        }
        Command::Check { input } => {
            let data = read_input(input)?;
            let value = decoder.decode(&data).context("input is not valid bencode")?;
            info!("{} bytes of valid bencode", data.len());
            writeln!(out, "ok")?;
            writeln!(out, "canonical: {}", if value.is_canonical() { "yes" } else { "no" })?;
        }
    }

    Ok(())
}

fn read_input(input: &Input) -> anyhow::Result<Vec<u8>> {
    if input.input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    if input.file {
        let path = Path::new(&input.input);
        return fs::read(path).with_context(|| format!("reading {}", path.display()));
    }
    Ok(input.input.as_bytes().to_vec())
}
