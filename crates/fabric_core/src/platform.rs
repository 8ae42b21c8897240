use std::fmt;

use thiserror::Error;

use crate::plan::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other(String),
}

impl Platform {
    /// Maps an operating-system identifier as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os.trim().to_ascii_lowercase().as_str() {
            "windows" => Platform::Windows,
            "macos" | "darwin" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }

    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        Self::from_os(std::env::consts::OS)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
            Platform::Other(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported platform: {platform}")]
pub struct UnsupportedPlatform {
    pub platform: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `'...'` with embedded quotes written as `'\''`.
    Posix,
    /// `"..."` with embedded quotes doubled.
    Cmd,
}

/// How a full command line is handed to the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
    pub program: String,
    pub command_flag: String,
    pub quote_style: QuoteStyle,
}

impl ShellInvocation {
    pub fn posix() -> Self {
        Self {
            program: "sh".to_string(),
            command_flag: "-c".to_string(),
            quote_style: QuoteStyle::Posix,
        }
    }

    pub fn cmd() -> Self {
        Self {
            program: "cmd".to_string(),
            command_flag: "/C".to_string(),
            quote_style: QuoteStyle::Cmd,
        }
    }

    pub fn quote(&self, word: &str) -> String {
        let plain = !word.is_empty()
            && word
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@+".contains(c));
        if plain {
            return word.to_string();
        }
        match self.quote_style {
            QuoteStyle::Posix => format!("'{}'", word.replace('\'', r"'\''")),
            QuoteStyle::Cmd => format!("\"{}\"", word.replace('"', "\"\"")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    pub platform: Platform,
    pub executable: String,
    pub clipboard: Stage,
    pub shell: ShellInvocation,
}

/// Resolves tool name, clipboard reader and shell rules for `platform`.
pub fn resolve(platform: &Platform, tool_name: &str) -> Result<ResolvedPlatform, UnsupportedPlatform> {
    let resolved = match platform {
        Platform::Windows => ResolvedPlatform {
            platform: platform.clone(),
            executable: windows_executable(tool_name),
            clipboard: Stage::new(
                "powershell.exe",
                [
                    "-command",
                    "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; Get-Clipboard",
                ],
            ),
            shell: ShellInvocation::cmd(),
        },
        Platform::MacOs => ResolvedPlatform {
            platform: platform.clone(),
            executable: tool_name.to_string(),
            clipboard: Stage::new("pbpaste", Vec::<String>::new()),
            shell: ShellInvocation::posix(),
        },
        Platform::Linux => ResolvedPlatform {
            platform: platform.clone(),
            executable: tool_name.to_string(),
            clipboard: Stage::new("xclip", ["-selection", "clipboard", "-o"]),
            shell: ShellInvocation::posix(),
        },
        Platform::Other(id) => {
            return Err(UnsupportedPlatform {
                platform: id.clone(),
            })
        }
    };
    Ok(resolved)
}

fn windows_executable(tool_name: &str) -> String {
    if tool_name.to_ascii_lowercase().ends_with(".exe") {
        tool_name.to_string()
    } else {
        format!("{tool_name}.exe")
    }
}
