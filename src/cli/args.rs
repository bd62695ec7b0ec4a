// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: workshop-downloader <command> [options]

Commands:
  download [--account NAME] [--dir PATH | --pick-dir] [FILE]
                      Download every workshop link in FILE (stdin when FILE
                      is omitted or '-'), one link or ID per line
  pick-dir            Choose and remember the save directory
  accounts            List configured accounts
  preview ID...       Show title and preview image of workshop items
  serve               Run the local API for a GUI front end
  help                Show this message

Configuration is read from config.toml (or $WSDL_CONFIG) and WSDL_* variables.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArgs {
    pub account: Option<String>,
    pub dir: Option<PathBuf>,
    pub pick_dir: bool,
    pub source: LinkSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Download(DownloadArgs),
    PickDir,
    Accounts,
    Preview(Vec<String>),
    Serve,
    Help,
}

/// Parse command line arguments, excluding the program name
pub fn parse_args<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "download" => parse_download(args).map(Command::Download),
        "pick-dir" => no_extra_args(args, Command::PickDir),
        "accounts" => no_extra_args(args, Command::Accounts),
        "serve" => no_extra_args(args, Command::Serve),
        "preview" => {
            let ids: Vec<String> = args.collect();
            if ids.is_empty() {
                return Err(anyhow::anyhow!("preview needs at least one workshop ID"));
            }
            Ok(Command::Preview(ids))
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(anyhow::anyhow!("Unknown command '{}'\n\n{}", other, USAGE)),
    }
}

fn no_extra_args<I>(mut args: I, command: Command) -> anyhow::Result<Command>
where
    I: Iterator<Item = String>,
{
    match args.next() {
        Some(extra) => Err(anyhow::anyhow!("Unexpected argument '{}'", extra)),
        None => Ok(command),
    }
}

fn parse_download<I>(mut args: I) -> anyhow::Result<DownloadArgs>
where
    I: Iterator<Item = String>,
{
    let mut parsed = DownloadArgs {
        account: None,
        dir: None,
        pick_dir: false,
        source: LinkSource::Stdin,
    };
    let mut file = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--account" | "-a" => {
                let value = args.next().ok_or_else(|| anyhow::anyhow!("--account needs a value"))?;
                parsed.account = Some(value);
            }
            "--dir" | "-d" => {
                let value = args.next().ok_or_else(|| anyhow::anyhow!("--dir needs a value"))?;
                parsed.dir = Some(PathBuf::from(value));
            }
            "--pick-dir" => parsed.pick_dir = true,
            "-" => file = Some(LinkSource::Stdin),
            flag if flag.starts_with('-') => {
                return Err(anyhow::anyhow!("Unknown option '{}'", flag));
            }
            path => {
                if file.is_some() {
                    return Err(anyhow::anyhow!("Only one links file may be given"));
                }
                file = Some(LinkSource::File(PathBuf::from(path)));
            }
        }
    }

    if parsed.dir.is_some() && parsed.pick_dir {
        return Err(anyhow::anyhow!("--dir and --pick-dir cannot be combined"));
    }

    parsed.source = file.unwrap_or(LinkSource::Stdin);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Command> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&["--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_download_defaults() {
        let Command::Download(args) = parse(&["download"]).unwrap() else {
            panic!("expected download");
        };
        assert_eq!(args.account, None);
        assert_eq!(args.dir, None);
        assert!(!args.pick_dir);
        assert_eq!(args.source, LinkSource::Stdin);
    }

    #[test]
    fn test_download_with_options() {
        let Command::Download(args) = parse(&[
            "download", "--account", "Account 2", "--dir", "/saves", "links.txt",
        ])
        .unwrap() else {
            panic!("expected download");
        };
        assert_eq!(args.account.as_deref(), Some("Account 2"));
        assert_eq!(args.dir, Some(PathBuf::from("/saves")));
        assert_eq!(args.source, LinkSource::File(PathBuf::from("links.txt")));
    }

    #[test]
    fn test_download_dash_is_stdin() {
        let Command::Download(args) = parse(&["download", "--pick-dir", "-"]).unwrap() else {
            panic!("expected download");
        };
        assert!(args.pick_dir);
        assert_eq!(args.source, LinkSource::Stdin);
    }

    #[test]
    fn test_download_rejects_bad_input() {
        assert!(parse(&["download", "--account"]).is_err());
        assert!(parse(&["download", "--bogus"]).is_err());
        assert!(parse(&["download", "a.txt", "b.txt"]).is_err());
        assert!(parse(&["download", "--dir", "/x", "--pick-dir"]).is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse(&["pick-dir"]).unwrap(), Command::PickDir);
        assert_eq!(parse(&["accounts"]).unwrap(), Command::Accounts);
        assert_eq!(parse(&["serve"]).unwrap(), Command::Serve);
        assert!(parse(&["serve", "now"]).is_err());
    }

    #[test]
    fn test_preview_needs_ids() {
        assert!(parse(&["preview"]).is_err());
        assert_eq!(
            parse(&["preview", "12345678", "87654321"]).unwrap(),
            Command::Preview(vec!["12345678".to_string(), "87654321".to_string()])
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse(&["frobnicate"]).unwrap_err();
        assert!(err.to_string().contains("Unknown command 'frobnicate'"));
    }
}
