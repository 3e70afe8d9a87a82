//! Speaker output through rodio.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it lives on its own
//! OS thread for the lifetime of the graph. Only the `Send + Sync`
//! `OutputStreamHandle` crosses back to the caller, which is all that sink
//! creation needs.
//!
//! The graph clock is wall time since the graph was opened (an `Instant`),
//! not the device's count of played samples. Positions derived from it can
//! drift from what is actually audible when the device buffers or stalls.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tutor_core::DecodedAudio;

use super::{AudioGraph, SourceNode};
use crate::error::VoiceError;

/// [`AudioGraph`] backed by the default output device.
pub struct RodioGraph {
    handle: OutputStreamHandle,
    epoch: Instant,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RodioGraph {
    /// Open the default output device on a dedicated thread.
    pub fn open_default() -> Result<Self, VoiceError> {
        let (init_tx, init_rx) = mpsc::channel::<Result<OutputStreamHandle, VoiceError>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("tutor-audio".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = init_tx.send(Ok(handle));
                    // Park until the graph is dropped; the stream must outlive
                    // every sink created from its handle.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output thread exiting");
                }
                Err(e) => {
                    let _ = init_tx.send(Err(VoiceError::OutputStreamError(e.to_string())));
                }
            })
            .map_err(|e| VoiceError::OutputStreamError(format!("failed to spawn audio thread: {e}")))?;

        let handle = init_rx.recv().map_err(|_| {
            VoiceError::OutputStreamError("audio thread exited during startup".into())
        })??;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            handle,
            epoch: Instant::now(),
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

impl AudioGraph for RodioGraph {
    /// Seconds since the graph was opened, by the wall clock.
    fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn create_source(&self, buffer: Arc<DecodedAudio>) -> Result<Box<dyn SourceNode>, VoiceError> {
        Ok(Box::new(RodioSource {
            handle: self.handle.clone(),
            buffer,
            rate: 1.0,
            sink: None,
            started: false,
        }))
    }
}

impl Drop for RodioGraph {
    fn drop(&mut self) {
        // Closing the channel wakes the audio thread.
        self.shutdown_tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

struct RodioSource {
    handle: OutputStreamHandle,
    buffer: Arc<DecodedAudio>,
    rate: f32,
    sink: Option<Sink>,
    started: bool,
}

impl SourceNode for RodioSource {
    fn set_playback_rate(&mut self, rate: f32) {
        self.rate = rate;
        if let Some(sink) = &self.sink {
            sink.set_speed(rate);
        }
    }

    fn connect(&mut self) -> Result<(), VoiceError> {
        if self.sink.is_none() {
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;
            sink.pause();
            self.sink = Some(sink);
        }
        Ok(())
    }

    fn start(&mut self, offset_secs: f64) -> Result<(), VoiceError> {
        if self.started {
            return Err(VoiceError::SourceState("source can only be started once"));
        }
        let Some(sink) = &self.sink else {
            return Err(VoiceError::SourceState("source must be connected before start"));
        };

        let source = SamplesBuffer::new(
            self.buffer.channels(),
            self.buffer.sample_rate(),
            self.buffer.samples().to_vec(),
        )
        .skip_duration(Duration::from_secs_f64(offset_secs.max(0.0)));

        sink.set_speed(self.rate);
        sink.append(source);
        sink.play();
        self.started = true;

        tracing::debug!(offset_secs, rate = self.rate, "Audio playback started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        match &self.sink {
            Some(sink) if self.started && !sink.empty() => {
                sink.stop();
                Ok(())
            }
            _ => Err(VoiceError::SourceState("source is not playing")),
        }
    }

    fn disconnect(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}
