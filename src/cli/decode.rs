//! Decode command implementation

use crate::codec::{extract_quote, FrameCodec, Payload};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File with one raw upstream message per line, or `-` for stdin
    pub input: PathBuf,

    /// Print recognised quotes only
    #[arg(short, long)]
    pub quotes_only: bool,
}

/// Totals over a decoded capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeSummary {
    pub messages: usize,
    pub control_tokens: usize,
    pub json_payloads: usize,
    pub quotes: Vec<f64>,
}

impl DecodeSummary {
    /// Decode every line of a capture, calling `emit` for each printable item
    pub fn from_capture(content: &str, quotes_only: bool, mut emit: impl FnMut(String)) -> Self {
        let mut summary = Self::default();

        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            summary.messages += 1;

            for payload in FrameCodec::decode(line) {
                match payload {
                    Payload::Control(token) => {
                        summary.control_tokens += 1;
                        if !quotes_only {
                            emit(format!("{:>5} control {}", line_no + 1, token));
                        }
                    }
                    Payload::Json(value) => {
                        summary.json_payloads += 1;
                        match extract_quote(&value) {
                            Some(quote) => {
                                summary.quotes.push(quote.price);
                                emit(format!(
                                    "{:>5} quote   {} {}",
                                    line_no + 1,
                                    quote.symbol.as_deref().unwrap_or("-"),
                                    quote.price
                                ));
                            }
                            None if !quotes_only => {
                                emit(format!("{:>5} json    {}", line_no + 1, value));
                            }
                            None => {}
                        }
                    }
                }
            }
        }

        summary
    }
}

impl DecodeArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let content = if self.input.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            tokio::fs::read_to_string(&self.input).await?
        };

        let summary = DecodeSummary::from_capture(&content, self.quotes_only, |line| {
            println!("{line}");
        });

        println!();
        println!("messages:       {}", summary.messages);
        println!("control tokens: {}", summary.control_tokens);
        println!("json payloads:  {}", summary.json_payloads);
        println!("quotes:         {}", summary.quotes.len());
        Ok(())
    }
}
