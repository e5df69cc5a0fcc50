// src/engine.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;

use crate::bencode::{bvalue_to_json, decode_with, to_bytes};
use crate::config::Config;
use crate::torrent::Torrent;

#[derive(Debug, Parser)]
#[command(name = "bencodec", version, about = "Decode and encode bencode data")]
pub struct Cli {
    /// Config file (defaults to ./bencodec.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reject non-canonical integers, padded lengths and trailing bytes
    #[arg(long, global = true)]
    pub strict: bool,

    /// Maximum list/dictionary nesting
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a bencoded string and print it as JSON
    Decode { value: String },
    /// Print the tracker URL, length and info hash of a .torrent file
    Info { path: PathBuf },
    /// Encode a JSON document as bencode
    Encode { json: String },
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.strict {
        config.strict = true;
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    if cli.pretty {
        config.pretty = true;
    }
    config.validate()?;

    debug!("Using {:?}", config);
    Ok(config)
}

pub fn use_command<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = resolve_config(&cli)?;
    let options = config.decode_options();

    match cli.command {
        Command::Decode { value } => {
            let decoded = decode_with(value.as_bytes(), &options)
                .context("decoding argument")?;
            let json_val = bvalue_to_json(&decoded);
            let text = if config.pretty {
                serde_json::to_string_pretty(&json_val)?
            } else {
                serde_json::to_string(&json_val)?
            };
            writeln!(out, "{}", text)?;
        }
        Command::Info { path } => {
            let torrent = Torrent::from_file(&path, &options)?;
            info!("Loaded torrent {}", path.display());

            writeln!(out, "Tracker URL: {}", torrent.announce.as_deref().unwrap_or("-"))?;
            match &torrent.info {
                Some(info) => {
                    let length = info.length.as_ref().map_or("-".to_string(), |l| l.to_string());
                    writeln!(out, "Length: {}", length)?;
                    writeln!(out, "File Name: {}", info.name.as_deref().unwrap_or("-"))?;
                    if let Some(piece_length) = &info.piece_length {
                        writeln!(out, "Piece Length: {}", piece_length)?;
                    }
                    writeln!(out, "Number of Pieces: {}", info.piece_count)?;
                    writeln!(out, "Info Hash: {}", hex::encode(info.info_hash))?;
                }
                None => {
                    warn!("{} has no info dictionary", path.display());
                    writeln!(out, "Length: -")?;
                }
            }
        }
        Command::Encode { json } => {
            let document: serde_json::Value =
                serde_json::from_str(&json).context("parsing JSON input")?;
            let encoded = to_bytes(&document).context("encoding JSON input")?;
            out.write_all(&encoded)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::BencodeError;

    fn run(args: &[&str]) -> Result<String> {
        let dir = tempfile::tempdir()?;
        let config = dir.path().join("absent.toml");
        let mut argv = vec!["bencodec", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        use_command(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_decode_command() {
        assert_eq!(run(&["decode", "d3:cow3:moo4:spam4:eggse"]).unwrap(), "{\"cow\":\"moo\",\"spam\":\"eggs\"}\n");
        assert_eq!(run(&["decode", "i-42e"]).unwrap(), "-42\n");
    }

    #[test]
    fn test_decode_command_errors() {
        let err = run(&["decode", "4:sp"]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BencodeError>(),
            Some(&BencodeError::TruncatedInput { pos: 4 })
        );
    }

    #[test]
    fn test_strict_flag() {
        assert_eq!(run(&["decode", "i-0e"]).unwrap(), "0\n");
        assert!(run(&["--strict", "decode", "i-0e"]).is_err());
        assert!(run(&["decode", "i1ejunk", "--strict"]).is_err());
    }

    #[test]
    fn test_max_depth_flag() {
        assert!(run(&["decode", "llleee"]).is_ok());
        let err = run(&["--max-depth", "2", "decode", "llleee"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BencodeError>(),
            Some(BencodeError::NestingTooDeep { max_depth: 2, .. })
        ));

        let err = run(&["--max-depth", "10000000", "decode", "le"]).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn test_encode_command() {
        assert_eq!(
            run(&["encode", r#"{"spam": "eggs", "cow": "moo", "n": [1, -2]}"#]).unwrap(),
            "d3:cow3:moo1:nli1ei-2ee4:spam4:eggse"
        );
        assert!(run(&["encode", "1.5"]).is_err());
        assert!(run(&["encode", "{not json"]).is_err());
    }

    #[test]
    fn test_info_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.torrent");
        std::fs::write(
            &path,
            b"d8:announce25:http://t.example/announce4:infod6:lengthi42e4:name5:a.txt12:piece lengthi16e6:pieces20:aaaaaaaaaaaaaaaaaaaaee",
        )
        .unwrap();

        let output = run(&["info", path.to_str().unwrap()]).unwrap();
        assert!(output.starts_with("Tracker URL: http://t.example/announce\nLength: 42\n"));
        assert!(output.contains("File Name: a.txt\n"));
        assert!(output.contains("Number of Pieces: 1\n"));
    }

    #[test]
    fn test_info_rejects_non_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.torrent");
        std::fs::write(&path, b"l4:spame").unwrap();

        let err = run(&["info", path.to_str().unwrap()]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BencodeError>(),
            Some(&BencodeError::NotATorrentDictionary)
        );
    }
}
