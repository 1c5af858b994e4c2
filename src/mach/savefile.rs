use super::serialize::{self, SaveHeader};
use super::Machine;
use crate::mem::Error;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

type Result<T> = std::result::Result<T, Error>;

/// ## Directory of save files
///
/// Slot `n` lives in `save{n:03}.sav`, global memory in `global.sav`.
/// Files are zstd streams around the serialized payload and are written
/// through a temporary file so a failed save never clobbers a good one.

#[derive(Debug, Clone, PartialEq)]
pub struct SaveDirectory {
    root: PathBuf,
    level: i32,
}

impl SaveDirectory {
    pub const DEFAULT_LEVEL: i32 = 3;

    pub fn new<P: Into<PathBuf>>(root: P) -> SaveDirectory {
        SaveDirectory {
            root: root.into(),
            level: SaveDirectory::DEFAULT_LEVEL,
        }
    }

    pub fn with_level(self, level: i32) -> SaveDirectory {
        SaveDirectory { level, ..self }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_path(&self, slot: usize) -> PathBuf {
        self.root.join(format!("save{:03}.sav", slot))
    }

    pub fn global_path(&self) -> PathBuf {
        self.root.join("global.sav")
    }

    pub fn save_game(&self, slot: usize, machine: &Machine) -> Result<()> {
        let path = self.game_path(slot);
        self.write_file(&path, |w| serialize::save_game(w, machine))?;
        info!(slot, path = %path.display(), "game saved");
        Ok(())
    }

    pub fn load_game(&self, slot: usize, machine: &mut Machine) -> Result<()> {
        let mut decoder = decompress(File::open(self.game_path(slot))?)?;
        serialize::load_game(&mut decoder, machine)?;
        info!(slot, "game loaded");
        Ok(())
    }

    pub fn read_header(&self, slot: usize) -> Result<SaveHeader> {
        let mut decoder = decompress(File::open(self.game_path(slot))?)?;
        serialize::load_game_header(&mut decoder)
    }

    pub fn save_global(&self, machine: &Machine) -> Result<()> {
        let path = self.global_path();
        self.write_file(&path, |w| serialize::save_global_memory(w, machine))?;
        info!(path = %path.display(), "global memory saved");
        Ok(())
    }

    /// Returns false when there is no global memory file yet.
    pub fn load_global(&self, machine: &mut Machine) -> Result<bool> {
        let file = match File::open(self.global_path()) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let mut decoder = decompress(file)?;
        serialize::load_global_memory(&mut decoder, machine)?;
        Ok(true)
    }

    /// Every readable slot with its header, newest first. Unreadable
    /// slot files are skipped.
    pub fn list_slots(&self) -> Result<Vec<(usize, SaveHeader)>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut slots = vec![];
        for entry in entries {
            let name = entry?.file_name();
            let slot = match name.to_str().and_then(slot_number) {
                Some(slot) => slot,
                None => continue,
            };
            match self.read_header(slot) {
                Ok(header) => slots.push((slot, header)),
                Err(error) => warn!(slot, %error, "unreadable save slot"),
            }
        }
        slots.sort_by(|a, b| b.1.saved_at.cmp(&a.1.saved_at).then(a.0.cmp(&b.0)));
        Ok(slots)
    }

    fn write_file<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut zstd::stream::Encoder<'static, BufWriter<File>>) -> Result<()>,
    {
        fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("tmp");
        let file = BufWriter::new(File::create(&tmp)?);
        let mut encoder = zstd::stream::Encoder::new(file, self.level)?;
        let written = write(&mut encoder)
            .and_then(|_| Ok(encoder.finish()?))
            .and_then(|mut file| Ok(file.flush()?));
        if let Err(error) = written {
            let _ = fs::remove_file(&tmp);
            return Err(error);
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// zstd reports damaged frames as `Other`; they are surfaced as
/// `InvalidData` so loading fails with CorruptData, not a disk error.
struct Frames<R>(R);

impl<R: Read> Read for Frames<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| match e.kind() {
            ErrorKind::Other => io::Error::new(ErrorKind::InvalidData, e),
            _ => e,
        })
    }
}

fn decompress(file: File) -> Result<Frames<zstd::stream::Decoder<'static, BufReader<File>>>> {
    Ok(Frames(zstd::stream::Decoder::new(file)?))
}

fn slot_number(file_name: &str) -> Option<usize> {
    let digits = file_name.strip_prefix("save")?.strip_suffix(".sav")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
