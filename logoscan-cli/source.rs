use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;
use image::ImageReader;
use log::{debug, trace};
use logoscan_core::Frame;

/// Errors from opening or reading a frame source
#[derive(Debug)]
pub enum SourceError {
    /// Input could not be opened or the decoder could not be started
    Open { path: PathBuf, source: io::Error },
    /// Input exists but its content could not be decoded
    Decode { path: PathBuf, message: String },
    /// The frame stream broke mid-run
    Stream { message: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Open { path, source } => {
                write!(f, "Failed to open {}: {}", path.display(), source)
            }
            SourceError::Decode { path, message } => {
                write!(f, "Failed to decode {}: {}", path.display(), message)
            }
            SourceError::Stream { message } => write!(f, "Frame stream error: {}", message),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Open { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Ordered frame supplier. Pull-based, so the pipeline controls pacing and
/// can stop between any two frames.
pub trait FrameSource {
    /// Next frame in stream order; `Ok(None)` is end of stream
    fn next_frame(&mut self) -> SourceResult<Option<Frame>>;
}

/// Frames decoded from a video file by a piped ffmpeg process
pub struct VideoSource {
    child: FfmpegChild,
    events: FfmpegIterator,
    path: PathBuf,
    delivered: u64,
    done: bool,
}

impl VideoSource {
    /// Spawn ffmpeg decoding the file to raw RGB frames on a pipe
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref().to_path_buf();
        fs::metadata(&path).map_err(|e| SourceError::Open {
            path: path.clone(),
            source: e,
        })?;

        let mut child = FfmpegCommand::new()
            .hide_banner()
            .input(path.to_string_lossy().as_ref())
            // Audio never participates in detection
            .args(["-an"])
            .rawvideo()
            .spawn()
            .map_err(|e| SourceError::Open {
                path: path.clone(),
                source: e,
            })?;

        let events = child.iter().map_err(|e| SourceError::Decode {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            child,
            events,
            path,
            delivered: 0,
            done: false,
        })
    }

    pub fn frames_delivered(&self) -> u64 {
        self.delivered
    }
}

impl FrameSource for VideoSource {
    fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        if self.done {
            return Ok(None);
        }
        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    self.delivered += 1;
                    return Ok(Some(Frame::new(frame.width, frame.height, frame.data)));
                }
                FfmpegEvent::Error(message)
                | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message) => {
                    self.done = true;
                    return Err(SourceError::Stream { message });
                }
                FfmpegEvent::Log(_, message) => trace!("ffmpeg: {}", message),
                FfmpegEvent::Done => {
                    debug!(
                        "Video {} ended after {} frames",
                        self.path.display(),
                        self.delivered
                    );
                    self.done = true;
                    return Ok(None);
                }
                _ => {}
            }
        }
        self.done = true;
        Ok(None)
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        // Stop ffmpeg promptly when the scan ends early, then reap it
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

const STILL_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frames read from a directory of still images, in filename order
#[derive(Debug)]
pub struct ImageDirSource {
    files: VecDeque<PathBuf>,
}

impl ImageDirSource {
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let dir = path.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| SourceError::Open {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::Open {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            let is_file = entry.file_type().map_or(false, |t| t.is_file());
            let is_still = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| {
                    STILL_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
                });
            if is_file && is_still {
                files.push(path);
            } else {
                trace!("Skipping non-frame entry {}", path.display());
            }
        }
        files.sort();
        debug!("Image directory {} holds {} frames", dir.display(), files.len());

        Ok(Self {
            files: files.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        Ok(Some(load_image(&path)?))
    }
}

/// In-memory source over a fixed frame list; synthetic runs and tests
#[derive(Debug, Default)]
pub struct BufferSource {
    frames: VecDeque<Frame>,
}

impl BufferSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for BufferSource {
    fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

/// Load a still image as an RGB frame
pub fn load_image<P: AsRef<Path>>(path: P) -> SourceResult<Frame> {
    let path = path.as_ref();
    let reader = ImageReader::open(path).map_err(|e| SourceError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let decoded = reader.decode().map_err(|e| SourceError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(width, height, rgb.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("logoscan_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32, value: u8) {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([value, value, value]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_load_image_round_trips_dimensions() {
        let dir = temp_dir("load");
        let path = dir.join("ref.png");
        write_png(&path, 24, 18, 90);

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (24, 18));
        assert_eq!(frame.data.len(), 24 * 18 * 3);
        assert!(frame.data.iter().all(|&b| b == 90));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_image_missing_file() {
        let err = load_image("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn test_image_dir_source_orders_by_name() {
        let dir = temp_dir("dir_order");
        write_png(&dir.join("frame_002.png"), 8, 8, 2);
        write_png(&dir.join("frame_001.png"), 8, 8, 1);
        write_png(&dir.join("frame_003.png"), 8, 8, 3);
        fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageDirSource::open(&dir).unwrap();
        assert_eq!(source.len(), 3);
        let mut values = Vec::new();
        while let Some(frame) = source.next_frame().unwrap() {
            values.push(frame.data[0]);
        }
        assert_eq!(values, vec![1, 2, 3]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_dir_source_empty_dir() {
        let dir = temp_dir("dir_empty");
        let mut source = ImageDirSource::open(&dir).unwrap();
        assert!(source.is_empty());
        assert!(source.next_frame().unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_dir_source_missing_dir() {
        assert!(matches!(
            ImageDirSource::open("no/such/dir"),
            Err(SourceError::Open { .. })
        ));
    }

    #[test]
    fn test_image_dir_source_corrupt_image_fails_on_read() {
        let dir = temp_dir("dir_corrupt");
        fs::write(dir.join("bad.png"), b"not a png").unwrap();

        let mut source = ImageDirSource::open(&dir).unwrap();
        assert_eq!(source.len(), 1);
        assert!(matches!(
            source.next_frame(),
            Err(SourceError::Decode { .. })
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_buffer_source_drains_in_order() {
        let frames = vec![Frame::new(2, 2, vec![1; 12]), Frame::new(2, 2, vec![2; 12])];
        let mut source = BufferSource::new(frames);
        assert_eq!(source.next_frame().unwrap().unwrap().data[0], 1);
        assert_eq!(source.next_frame().unwrap().unwrap().data[0], 2);
        assert!(source.next_frame().unwrap().is_none());
    }
}
