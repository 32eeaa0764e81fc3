#![forbid(unsafe_code)]

//! Gesture trace recording for deterministic replay.
//!
//! A trace captures everything a [`GestureTracker`](orbitcam_core::GestureTracker)
//! consumes: the settings and scene it was built with, then every frame's
//! pointer events, scroll delta, clock, and host mode flags.
//!
//! # Format
//!
//! JSON Lines, one object per line, tagged by `event`. The first line is a
//! `trace_header`, the last a `trace_summary`, everything between is `frame`.
//! Pointer phases are stored as their numeric wire codes.
//!
//! ```text
//! {"event":"trace_header","schema_version":"gesture-trace-v1","session_name":"pinch","seed":7,...}
//! {"event":"frame","frame":1,"now":0.016,"delta":0.016,"pointers":[{"id":1,"phase":0,"x":0.3,"y":0.5,"t":0.016}]}
//! {"event":"trace_summary","total_frames":1,"total_events":1,"duration_s":0.0}
//! ```
//!
//! # Storage
//!
//! Plain `.jsonl` or gzip `.jsonl.gz`. The reader detects gzip by its magic
//! bytes.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use orbitcam_core::glam::Vec2;
use orbitcam_core::{
    FrameTime, GestureSettings, PerspectiveScene, PhaseError, PointerEvent, PointerId,
    PointerPhase, SourceId,
};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

// ---------------------------------------------------------------------------
// Schema version
// ---------------------------------------------------------------------------

/// Current schema version for gesture trace files.
pub const SCHEMA_VERSION: &str = "gesture-trace-v1";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ---------------------------------------------------------------------------
// Serializable trace records
// ---------------------------------------------------------------------------

/// A single line in a gesture trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum TraceRecord {
    /// Header record (first line).
    #[serde(rename = "trace_header")]
    Header(TraceHeader),

    /// One resolved frame of input.
    #[serde(rename = "frame")]
    Frame(TraceFrame),

    /// Summary record (last line).
    #[serde(rename = "trace_summary")]
    Summary {
        total_frames: u64,
        total_events: u64,
        duration_s: f64,
    },
}

/// Session metadata written at the top of every trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceHeader {
    pub schema_version: String,
    pub session_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub scene: PerspectiveScene,
    #[serde(default)]
    pub settings: GestureSettings,
}

impl TraceHeader {
    /// Header for the current schema with default scene and settings.
    #[must_use]
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            session_name: session_name.into(),
            seed: None,
            scene: PerspectiveScene::default(),
            settings: GestureSettings::default(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_scene(mut self, scene: PerspectiveScene) -> Self {
        self.scene = scene;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: GestureSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Input for one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraceFrame {
    pub frame: u64,
    pub now: f64,
    pub delta: f32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub navigating: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub true_north: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub scroll: [f32; 2],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pointers: Vec<TracePointer>,
}

/// One pointer event inside a [`TraceFrame`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TracePointer {
    pub id: u32,
    /// Omitted when equal to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<u32>,
    pub phase: u8,
    pub x: f32,
    pub y: f32,
    pub t: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<[f32; 2]>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &[f32; 2]) -> bool {
    value[0] == 0.0 && value[1] == 0.0
}

// ---------------------------------------------------------------------------
// Conversion: PointerEvent <-> TracePointer
// ---------------------------------------------------------------------------

impl TracePointer {
    #[must_use]
    pub fn from_event(event: &PointerEvent) -> Self {
        Self {
            id: event.id.0,
            source: (event.source.0 != event.id.0).then_some(event.source.0),
            phase: event.phase.code(),
            x: event.position.x,
            y: event.position.y,
            t: event.time,
            scroll: event.scroll_delta.map(|d| d.to_array()),
        }
    }

    /// Decode back into a [`PointerEvent`]. Fails on an unknown phase code.
    pub fn to_event(&self) -> std::result::Result<PointerEvent, PhaseError> {
        Ok(PointerEvent {
            id: PointerId(self.id),
            source: SourceId(self.source.unwrap_or(self.id)),
            phase: PointerPhase::try_from(self.phase)?,
            position: Vec2::new(self.x, self.y),
            time: self.t,
            scroll_delta: self.scroll.map(Vec2::from_array),
        })
    }
}

impl TraceFrame {
    /// Frame with no input at the given clock.
    #[must_use]
    pub fn at(time: FrameTime) -> Self {
        Self {
            frame: time.frame,
            now: time.now,
            delta: time.delta,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: PointerEvent) -> Self {
        self.pointers.push(TracePointer::from_event(&event));
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, delta: Vec2) -> Self {
        self.scroll = (Vec2::from_array(self.scroll) + delta).to_array();
        self
    }

    #[must_use]
    pub fn with_modes(mut self, navigating: bool, true_north: bool) -> Self {
        self.navigating = navigating;
        self.true_north = true_north;
        self
    }

    /// Clock for this frame.
    #[must_use]
    pub fn time(&self) -> FrameTime {
        FrameTime::new(self.frame, self.now, self.delta)
    }

    /// Host-level scroll delta (not attached to any pointer).
    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        Vec2::from_array(self.scroll)
    }

    /// Decode the pointer events.
    pub fn events(&self) -> std::result::Result<Vec<PointerEvent>, PhaseError> {
        self.pointers.iter().map(TracePointer::to_event).collect()
    }
}

// ---------------------------------------------------------------------------
// TraceWriter: writes frames to (optionally gzip-compressed) JSONL
// ---------------------------------------------------------------------------

/// Writes gesture trace records to a JSONL stream.
pub struct TraceWriter<W: Write> {
    writer: BufWriter<W>,
    frame_count: u64,
    event_count: u64,
    first_now: Option<f64>,
    last_now: f64,
}

impl TraceWriter<std::fs::File> {
    /// Create a writer for an uncompressed JSONL file.
    pub fn plain(path: impl AsRef<Path>, header: &TraceHeader) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Self::from_writer(file, header)
    }
}

impl TraceWriter<flate2::write::GzEncoder<std::fs::File>> {
    /// Create a writer for a gzip-compressed JSONL file.
    pub fn gzip(path: impl AsRef<Path>, header: &TraceHeader) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
        Self::from_writer(encoder, header)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Create a writer wrapping any `Write` implementation.
    pub fn from_writer(writer: W, header: &TraceHeader) -> io::Result<Self> {
        let mut w = BufWriter::new(writer);

        // Write header record.
        serde_json::to_writer(&mut w, &TraceRecord::Header(header.clone()))
            .map_err(io::Error::other)?;
        w.write_all(b"\n")?;

        Ok(Self {
            writer: w,
            frame_count: 0,
            event_count: 0,
            first_now: None,
            last_now: 0.0,
        })
    }

    /// Append one frame.
    pub fn write_frame(&mut self, frame: &TraceFrame) -> io::Result<()> {
        self.first_now.get_or_insert(frame.now);
        self.last_now = frame.now;
        self.frame_count += 1;
        self.event_count += frame.pointers.len() as u64;

        let record = TraceRecord::Frame(frame.clone());
        serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")
    }

    /// Frames written so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Finish the trace: write summary and flush.
    ///
    /// Returns the underlying writer for further use.
    pub fn finish(mut self) -> io::Result<W> {
        let duration_s = self
            .first_now
            .map(|first| (self.last_now - first).max(0.0))
            .unwrap_or(0.0);

        let summary = TraceRecord::Summary {
            total_frames: self.frame_count,
            total_events: self.event_count,
            duration_s,
        };
        serde_json::to_writer(&mut self.writer, &summary).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Write a complete trace to `path`, gzip-compressed when `gzip` is set.
pub fn write_trace_file(
    path: impl AsRef<Path>,
    header: &TraceHeader,
    frames: &[TraceFrame],
    gzip: bool,
) -> io::Result<()> {
    if gzip {
        let mut writer = TraceWriter::gzip(path, header)?;
        for frame in frames {
            writer.write_frame(frame)?;
        }
        writer.finish()?.finish()?;
    } else {
        let mut writer = TraceWriter::plain(path, header)?;
        for frame in frames {
            writer.write_frame(frame)?;
        }
        writer.finish()?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// TraceReader: reads JSONL (gzip or plain)
// ---------------------------------------------------------------------------

/// Reads gesture traces.
///
/// Gzip input is detected by the magic bytes (0x1f, 0x8b).
pub struct TraceReader;

impl TraceReader {
    /// Open a trace file and parse all records.
    pub fn open(path: impl AsRef<Path>) -> Result<TraceFile> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Parse trace records from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Result<TraceFile> {
        let text = if data.starts_with(&GZIP_MAGIC) {
            let mut decoder = flate2::read::GzDecoder::new(data);
            let mut buf = Vec::new();
            decoder.read_to_end(&mut buf)?;
            buf
        } else {
            data.to_vec()
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(text.as_slice()).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(&line).map_err(|e| {
                HarnessError::invalid_trace(format!("line {}: {e}", line_no + 1))
            })?;
            records.push(record);
        }

        Ok(TraceFile { records })
    }
}

/// A parsed gesture trace.
#[derive(Debug, Clone)]
pub struct TraceFile {
    records: Vec<TraceRecord>,
}

impl TraceFile {
    /// Build from already-parsed records.
    #[must_use]
    pub fn from_records(records: Vec<TraceRecord>) -> Self {
        Self { records }
    }

    /// All records.
    #[inline]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// The header record, if present.
    #[must_use]
    pub fn header(&self) -> Option<&TraceHeader> {
        match self.records.first() {
            Some(TraceRecord::Header(header)) => Some(header),
            _ => None,
        }
    }

    /// The frame records in file order.
    pub fn frames(&self) -> impl Iterator<Item = &TraceFrame> {
        self.records.iter().filter_map(|r| match r {
            TraceRecord::Frame(frame) => Some(frame),
            _ => None,
        })
    }

    /// `(total_frames, total_events)` from the summary record, if present.
    #[must_use]
    pub fn summary_counts(&self) -> Option<(u64, u64)> {
        match self.records.last() {
            Some(TraceRecord::Summary {
                total_frames,
                total_events,
                ..
            }) => Some((*total_frames, *total_events)),
            _ => None,
        }
    }

    /// Session seed from the header.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.header().and_then(|h| h.seed)
    }

    /// Check structure: a current-schema header first, strictly increasing
    /// frame numbers, and a summary (when present) that matches the body.
    pub fn validate(&self) -> Result<&TraceHeader> {
        let header = self
            .header()
            .ok_or_else(|| HarnessError::invalid_trace("missing trace_header"))?;
        if header.schema_version != SCHEMA_VERSION {
            return Err(HarnessError::invalid_trace(format!(
                "unsupported schema {}",
                header.schema_version
            )));
        }

        let mut last: Option<u64> = None;
        for frame in self.frames() {
            if last.is_some_and(|prev| frame.frame <= prev) {
                return Err(HarnessError::invalid_trace(format!(
                    "frame {} does not follow frame {}",
                    frame.frame,
                    last.unwrap_or_default()
                )));
            }
            last = Some(frame.frame);
        }

        if let Some((frames, events)) = self.summary_counts() {
            let actual_frames = self.frames().count() as u64;
            let actual_events: u64 = self.frames().map(|f| f.pointers.len() as u64).sum();
            if frames != actual_frames || events != actual_events {
                return Err(HarnessError::invalid_trace(format!(
                    "summary reports {frames} frames/{events} events, body has \
                     {actual_frames}/{actual_events}"
                )));
            }
        }

        Ok(header)
    }
}
