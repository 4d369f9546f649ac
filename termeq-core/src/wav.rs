//! # WAV Persistence
//!
//! Block-oriented WAV reading and writing on top of hound. The writer
//! produces 16-bit PCM; the reader accepts 16-bit PCM or 32-bit float
//! files and converts them to `f32` blocks for the pipeline.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

/// Writes fixed-size sample blocks to a 16-bit PCM WAV file.
pub struct WavBlockWriter {
    writer: WavWriter<BufWriter<File>>,
}

impl WavBlockWriter {
    pub fn create(path: &Path, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("could not create {}", path.display()))?;
        Ok(Self { writer })
    }

    /// Appends one block of interleaved samples, clamped to [-1, 1].
    pub fn write_block(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            self.writer.write_sample(value)?;
        }
        Ok(())
    }

    /// Finishes the file, flushing the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Reads a WAV file one fixed-size block at a time.
pub struct WavBlockReader {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
}

impl WavBlockReader {
    pub fn open(path: &Path) -> Result<Self> {
        let reader =
            WavReader::open(path).with_context(|| format!("could not open {}", path.display()))?;
        let spec = reader.spec();
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) | (SampleFormat::Float, 32) => {}
            (format, bits) => bail!("unsupported WAV format: {bits}-bit {format:?}"),
        }

        info!(
            "[WAV] {}: {} channel(s), {} Hz, {} frames",
            path.display(),
            spec.channels,
            spec.sample_rate,
            reader.duration()
        );

        Ok(Self { reader, spec })
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Fills `out` with the next interleaved block.
    ///
    /// A short final block is zero-padded; the return value is the
    /// number of whole frames actually read, or `None` once the file is
    /// exhausted.
    pub fn next_block(&mut self, out: &mut [f32]) -> Result<Option<usize>> {
        let mut read = 0;
        match self.spec.sample_format {
            SampleFormat::Int => {
                for sample in self.reader.samples::<i16>().take(out.len()) {
                    out[read] = sample? as f32 / i16::MAX as f32;
                    read += 1;
                }
            }
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(out.len()) {
                    out[read] = sample?;
                    read += 1;
                }
            }
        }

        if read == 0 {
            return Ok(None);
        }
        out[read..].fill(0.0);
        Ok(Some(read / self.spec.channels as usize))
    }
}
