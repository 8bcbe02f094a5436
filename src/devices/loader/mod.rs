//! Streaming image loader.
//!
//! The loader sits between the mass-storage layer and the flash. It sees a
//! file as a sequence of chunks, recognizes its format from its first word,
//! and hands every chunk to the matching decoder, which programs flash as
//! soon as each record is complete. No image is ever held whole in RAM.
//!
//! A session ends in a terminal status (success or one of the failures).
//! Terminal statuses are latched: further chunks are ignored until the
//! storage layer announces a new file.

use self::{
    classifier::classify,
    codewarrior::CodeWarrior,
    erase::{ErasedSectors, FlashWriter},
    raw::RawBinary,
    srecord::SRecord,
};
use crate::{
    devices::{layout::Layout, traits::Flash},
    error::{self, Convertible},
    utilities::log::{error, info},
};

pub mod classifier;
pub mod codewarrior;
pub mod erase;
pub mod raw;
pub mod srecord;

/// Bytes the format is recognized from.
const CLASSIFICATION_LENGTH: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// No data received since the last new file.
    Ready,
    /// Image recognized and being programmed.
    Started,
    Success,
    /// The image is malformed, corrupted or targets invalid memory.
    S19Error,
    FlashError,
    /// The file is none of the supported formats.
    Unsupported,
}

impl Status {
    pub fn is_terminal(self) -> bool { !matches!(self, Status::Ready | Status::Started) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileType {
    Unknown,
    RawBinary,
    CodeWarrior,
    SRecord,
}

impl FileType {
    pub fn name(self) -> &'static str {
        match self {
            FileType::Unknown => "unknown",
            FileType::RawBinary => "raw binary",
            FileType::CodeWarrior => "CodeWarrior",
            FileType::SRecord => "S-record",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Unrecognized file header.
    Classification,
    /// Bad hex digit, record type or record length.
    RecordFormat,
    Checksum,
    /// Record targets protected or nonexistent memory.
    AddressRange,
    /// The file ended inside a record, or before its terminator.
    Truncated,
    Flash(error::Error),
}

impl Error {
    /// Terminal status a session ends in because of this error.
    pub fn status(self) -> Status {
        match self {
            Error::Classification => Status::Unsupported,
            Error::Flash(_) => Status::FlashError,
            _ => Status::S19Error,
        }
    }
}

impl Convertible for Error {
    fn into(self) -> error::Error {
        match self {
            Error::Classification => error::Error::UnsupportedFile,
            Error::RecordFormat => error::Error::RecordMalformed,
            Error::Checksum => error::Error::ChecksumMismatch,
            Error::AddressRange => error::Error::AddressOutOfRange,
            Error::Truncated => error::Error::ImageTruncated,
            Error::Flash(e) => e,
        }
    }
}

/// Outcome of feeding a chunk that didn't fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    Continue,
    /// The image declared its own end.
    Complete,
}

enum Decoder {
    Idle,
    Raw(RawBinary),
    CodeWarrior(CodeWarrior),
    SRecord(SRecord),
}

/// State of the single transfer in progress.
pub struct ImageSession {
    decoder: Decoder,
    /// First bytes of the file, held until there are enough to classify it.
    staged: heapless::Vec<u8, CLASSIFICATION_LENGTH>,
    bytes_written: usize,
    status: Status,
    last_error: Option<Error>,
}

impl ImageSession {
    fn new() -> Self {
        Self {
            decoder: Decoder::Idle,
            staged: heapless::Vec::new(),
            bytes_written: 0,
            status: Status::Ready,
            last_error: None,
        }
    }

    pub fn file_type(&self) -> FileType {
        match self.decoder {
            Decoder::Idle => FileType::Unknown,
            Decoder::Raw(_) => FileType::RawBinary,
            Decoder::CodeWarrior(_) => FileType::CodeWarrior,
            Decoder::SRecord(_) => FileType::SRecord,
        }
    }

    /// File bytes received so far.
    pub fn bytes_written(&self) -> usize { self.bytes_written }

    pub fn status(&self) -> Status { self.status }

    pub fn last_error(&self) -> Option<Error> { self.last_error }

    fn fail(&mut self, e: Error) {
        error!("Image load failed: {:?}", e);
        self.status = e.status();
        self.last_error = Some(e);
    }
}

pub struct Loader<F: Flash> {
    flash: F,
    layout: Layout,
    session: ImageSession,
    erased: ErasedSectors,
}

impl<F: Flash> Loader<F> {
    pub fn new(flash: F, layout: Layout) -> Self {
        Self { flash, layout, session: ImageSession::new(), erased: ErasedSectors::new() }
    }

    /// Abandons whatever was in progress and gets ready for a new file.
    pub fn on_new_file(&mut self) {
        self.session = ImageSession::new();
        self.erased.clear();
    }

    /// Processes the next chunk of the file.
    pub fn on_chunk(&mut self, bytes: &[u8]) -> Status {
        if self.session.status.is_terminal() || bytes.is_empty() {
            return self.session.status;
        }

        let mut bytes = bytes;
        if let Decoder::Idle = self.session.decoder {
            // The format is decided on the first word, which may arrive split
            // over several chunks.
            let staged = &mut self.session.staged;
            let take = (CLASSIFICATION_LENGTH - staged.len()).min(bytes.len());
            let (head, rest) = bytes.split_at(take);
            if staged.extend_from_slice(head).is_err() || staged.len() < CLASSIFICATION_LENGTH {
                return self.session.status;
            }
            bytes = rest;

            self.session.decoder = match classify(&self.layout, staged) {
                FileType::Unknown => {
                    self.session.fail(Error::Classification);
                    return self.session.status;
                }
                FileType::RawBinary => Decoder::Raw(RawBinary::new()),
                FileType::CodeWarrior => Decoder::CodeWarrior(CodeWarrior::new()),
                FileType::SRecord => Decoder::SRecord(SRecord::new()),
            };
            info!("Receiving {:?} image", self.session.file_type());
            self.session.status = Status::Started;

            let staged = self.session.staged.clone();
            self.session.staged.clear();
            if let Some(status) = self.feed(&staged) {
                // The rest of the chunk counts as received.
                self.session.bytes_written += bytes.len();
                return status;
            }
        }

        self.feed(bytes);
        self.session.status
    }

    /// Hands bytes to the active decoder. Returns the status if it became
    /// terminal.
    fn feed(&mut self, bytes: &[u8]) -> Option<Status> {
        if bytes.is_empty() {
            return None;
        }
        let offset = self.session.bytes_written;
        let mut writer = FlashWriter::new(&mut self.flash, &self.layout, &mut self.erased);
        let result = match &mut self.session.decoder {
            Decoder::Idle => Ok(Progress::Continue),
            Decoder::Raw(raw) => raw.feed(&mut writer, offset, bytes).map(|_| Progress::Continue),
            Decoder::CodeWarrior(codewarrior) => {
                codewarrior.feed(&mut writer, bytes).map(|_| Progress::Continue)
            }
            Decoder::SRecord(srecord) => srecord.feed(&mut writer, bytes),
        };
        self.session.bytes_written += bytes.len();

        match result {
            Ok(Progress::Continue) => (),
            Ok(Progress::Complete) => self.succeed(),
            Err(e) => self.session.fail(e),
        }
        self.session.status.is_terminal().then_some(self.session.status)
    }

    /// Processes the storage layer's notice that the file was fully written.
    pub fn on_end_of_file(&mut self) -> Status {
        if self.session.status.is_terminal() {
            return self.session.status;
        }

        let offset = self.session.bytes_written;
        let mut writer = FlashWriter::new(&mut self.flash, &self.layout, &mut self.erased);
        let result = match &mut self.session.decoder {
            // Too short to be an image of any kind.
            Decoder::Idle if !self.session.staged.is_empty() => Err(Error::Classification),
            Decoder::Idle => return self.session.status,
            Decoder::Raw(raw) => raw.finish(&mut writer, offset),
            Decoder::CodeWarrior(codewarrior) if codewarrior.is_mid_record() => {
                Err(Error::Truncated)
            }
            Decoder::CodeWarrior(_) => Ok(()),
            // A complete S-record image ends in success before the file does.
            Decoder::SRecord(_) => Err(Error::Truncated),
        };

        match result {
            Ok(()) => self.succeed(),
            Err(e) => self.session.fail(e),
        }
        self.session.status
    }

    fn succeed(&mut self) {
        info!("Image loaded, {:?} bytes received", self.session.bytes_written);
        self.session.status = Status::Success;
    }

    pub fn status(&self) -> Status { self.session.status }

    pub fn file_type(&self) -> FileType { self.session.file_type() }

    /// The error that ended the current session, if any.
    pub fn last_error(&self) -> Option<Error> { self.session.last_error }

    pub fn session(&self) -> &ImageSession { &self.session }

    pub fn flash(&self) -> &F { &self.flash }
}
