use log::warn;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Split, Write};
use std::path::{Path, PathBuf};

pub const HIGH_SCORE_FILE: &str = "highscores.txt";
pub const TOP_N: usize = 10;
pub const MAX_NAME_LEN: usize = 16;
const ANONYMOUS: &str = "anonymous";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScore {
    pub score: u32,
    pub name: String,
}

impl HighScore {
    /// Whitespace and control characters would break the line format, so
    /// they are dropped.
    pub fn new(score: u32, name: &str) -> Self {
        let name: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .take(MAX_NAME_LEN)
            .collect();
        HighScore {
            score,
            name: if name.is_empty() {
                ANONYMOUS.to_string()
            } else {
                name
            },
        }
    }

    /// Parses `"<score> <name>"`. Anything else is `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let score = fields.next()?.parse().ok()?;
        let name = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(HighScore {
            score,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for HighScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.score, self.name)
    }
}

/// Highest first. Equal scores keep their file order.
pub fn rank(records: impl IntoIterator<Item = HighScore>) -> Vec<HighScore> {
    let mut ranked: Vec<_> = records.into_iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

pub fn top(ranked: &[HighScore]) -> &[HighScore] {
    &ranked[..ranked.len().min(TOP_N)]
}

/// Records read lazily from the store, skipping lines that don't parse.
pub struct Records {
    lines: Option<Split<BufReader<File>>>,
}

impl Iterator for Records {
    type Item = HighScore;

    fn next(&mut self) -> Option<HighScore> {
        loop {
            let bytes = match self.lines.as_mut()?.next()? {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Stopped reading high scores: {}", e);
                    self.lines = None;
                    return None;
                }
            };
            let Ok(line) = String::from_utf8(bytes) else {
                warn!("Skipping high score line that is not UTF-8");
                continue;
            };
            match HighScore::parse(&line) {
                Some(record) => return Some(record),
                None if line.trim().is_empty() => {}
                None => warn!("Skipping malformed high score line {:?}", line),
            }
        }
    }
}

/// Append-only flat file of `"<score> <name>"` lines.
#[derive(Clone, Debug)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A store that has never been written to reads as empty.
    pub fn load(&self) -> io::Result<Records> {
        match File::open(&self.path) {
            Ok(file) => Ok(Records {
                lines: Some(BufReader::new(file).split(b'\n')),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Records { lines: None }),
            Err(e) => Err(e),
        }
    }

    pub fn append(&self, record: &HighScore) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}\n", record).as_bytes())
    }

    /// Reads what is there, adds `record` to the file and returns everything
    /// ranked.
    pub fn record(&self, record: HighScore) -> io::Result<Vec<HighScore>> {
        let mut records: Vec<_> = self.load()?.collect();
        self.append(&record)?;
        records.push(record);
        Ok(rank(records))
    }

    pub fn ranked(&self) -> io::Result<Vec<HighScore>> {
        Ok(rank(self.load()?))
    }
}
