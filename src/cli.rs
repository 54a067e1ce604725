//! Minimal CLI: encode | decode | format | serve
use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use json_si::json::{self, Decoder, Encoder};
use json_si::model::{self, Person};
use json_si::{Node, Populate, Project};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert person records to and from JSON through a generic tree
#[derive(Parser, Debug)]
#[command(name = "json-si", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// project the reference record and write it as JSON
    Encode(EncodeOut),
    /// read Person documents and print who they describe
    Decode(DecodeIn),
    /// decode any JSON into a tree and write it back out
    Format(FormatOut),
    /// serve documents over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// Inputs: literal paths, quoted glob patterns or '-' for stdin.
    ///
    /// Reads stdin when omitted.
    #[arg(long, short, num_args = 1..)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// pretty-print the JSON output
    #[arg(short = 'b', long, default_value_t = false)]
    beautify: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Document {
    Person,
    Address,
}

#[derive(clap::Parser, Debug)]
struct EncodeOut {
    /// which reference record to project
    #[arg(long, value_enum, default_value_t = Document::Person)]
    document: Document,

    #[command(flatten)]
    output: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct DecodeIn {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct FormatOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct ServeArgs {
    /// address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// directory served for raw `/<name>` requests
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// pretty-print JSON documents
    #[arg(short = 'b', long, default_value_t = false)]
    beautify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_owned(),
            Source::File(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> Result<Vec<u8>> {
        match self {
            Source::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut bytes)
                    .context("failed to read stdin")?;
                Ok(bytes)
            }
            Source::File(path) => std::fs::read(path)
                .with_context(|| format!("failed to read source file: {}", path.display())),
        }
    }
}

impl InputSettings {
    /// Decodes every document of every input, in order, and hands each tree to
    /// `apply`.
    fn load_process(&self, mut apply: impl FnMut(Node) -> Result<()>) -> Result<()> {
        let sources = resolve_sources(&self.input)?;
        for source in sources {
            let label = source.label();
            debug!(source = %label, ndjson = self.ndjson, "reading input");
            let bytes = source.read()?;
            if self.ndjson {
                let text = std::str::from_utf8(&bytes)
                    .with_context(|| format!("input is not UTF-8 ({label})"))?;
                let mut decoder = Decoder::new(text);
                while let Some(node) = decoder
                    .next_value()
                    .with_context(|| format!("failed to parse JSON source ({label})"))?
                {
                    apply(node)?;
                }
            } else {
                let node = json::decode_slice(&bytes)
                    .with_context(|| format!("failed to parse JSON source ({label})"))?;
                apply(node)?;
            }
        }
        Ok(())
    }
}

impl OutputSettings {
    fn encoder(&self) -> Encoder {
        Encoder::new().pretty(self.beautify)
    }

    /// Writes the fully encoded `text`; nothing is written if encoding failed
    /// earlier.
    fn write(&self, text: &str) -> Result<()> {
        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(out, format!("{text}\n"))
                    .with_context(|| format!("failed to write {}", out.display()))?;
                info!(path = %out.display(), bytes = text.len(), "wrote output");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{text}").context("failed to write stdout")?;
            }
        }
        Ok(())
    }
}

impl Document {
    fn project(self) -> Node {
        let person = model::john_smith();
        match self {
            Document::Person => person.project(),
            Document::Address => person.base.address.project(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.cmd {
            Command::Serve(_) => "info",
            _ => "warn",
        }
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Encode(target) => {
                let node = target.document.project();
                let text = target.output.encoder().encode(&node)?;
                target.output.write(&text)
            }
            Command::Decode(target) => {
                let mut stdout = std::io::stdout().lock();
                target.input_settings.load_process(|node| {
                    let person = Person::populate(&node)?;
                    writeln!(
                        stdout,
                        "first name: {}\nlast name: {}\nage: {}",
                        person.base.first_name, person.base.last_name, person.base.age
                    )?;
                    Ok(())
                })
            }
            Command::Format(target) => {
                let encoder = target.output.encoder();
                let mut documents = Vec::new();
                target.input_settings.load_process(|node| {
                    documents.push(encoder.encode(&node)?);
                    Ok(())
                })?;
                target.output.write(&documents.join("\n"))
            }
            Command::Serve(target) => {
                let config = crate::serve::ServeConfig {
                    bind: SocketAddr::new(target.bind, target.port),
                    root: target.root.clone(),
                    pretty: target.beautify,
                };
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .context("failed to start async runtime")?;
                runtime.block_on(crate::serve::serve(config))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_sources(inputs: &[String]) -> Result<Vec<Source>> {
    if inputs.is_empty() {
        return Ok(vec![Source::Stdin]);
    }
    let mut out = Vec::new();
    for input in inputs {
        if input == "-" {
            out.push(Source::Stdin);
        } else {
            out.extend(resolve_file_path_patterns([input])?.into_iter().map(Source::File));
        }
    }
    Ok(out)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = Vec::new();
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                matched.push(entry?);
            }
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_inputs_means_stdin() {
        assert_eq!(resolve_sources(&[]).unwrap(), vec![Source::Stdin]);
        assert_eq!(resolve_sources(&["-".to_owned()]).unwrap(), vec![Source::Stdin]);
    }

    #[test]
    fn globs_expand_and_empty_globs_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "[]").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let sources = resolve_sources(&[pattern]).unwrap();
        assert_eq!(sources.len(), 2);

        let missing = format!("{}/*.yaml", dir.path().display());
        assert!(resolve_sources(&[missing]).is_err());
    }

    #[test]
    fn ndjson_inputs_yield_every_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.ndjson");
        std::fs::write(&path, "{\"a\":1}\n{\"a\":2}\n").unwrap();

        let settings = InputSettings {
            ndjson: true,
            input: vec![path.display().to_string()],
        };
        let mut seen = Vec::new();
        settings
            .load_process(|node| {
                seen.push(node.get_member("a")?.to_u64()?);
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn decode_errors_keep_their_kind_through_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"firstName": "John", "age": }"#).unwrap();

        let settings = InputSettings {
            ndjson: false,
            input: vec![path.display().to_string()],
        };
        let err = settings.load_process(|_| Ok(())).unwrap_err();
        let inner = err.downcast_ref::<json_si::Error>().unwrap();
        assert_eq!(inner.kind(), json_si::ErrorKind::Syntax);
    }

    #[test]
    fn file_output_is_complete_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("person.json");
        let settings = OutputSettings {
            beautify: true,
            out: Some(out.clone()),
        };
        let text = settings.encoder().encode(&Document::Person.project()).unwrap();
        settings.write(&text).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let person: Person = json_si::from_json(&written).unwrap();
        assert_eq!(person, model::john_smith());
    }
}
