// Audio output - cpal stream playing metronome clicks
//
// The device is opened once per `AudioOutput`. Clicks reach the real-time
// callback through a lock-free ring buffer; the callback never allocates,
// locks or logs.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};

use crate::audio::click::{ClickRequest, ClickVoice};
use crate::messaging::channels::{ClickConsumer, ClickProducer, create_click_channel};
use crate::sequencer::metronome::ClickSink;
use crate::sequencer::tempo::{ClickType, SoundType};

/// Clicks that may be queued before the callback drains them
const CLICK_QUEUE_CAPACITY: usize = 8;

/// Audio output error types
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Audio configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported sample format: {0:?}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(SampleFormat),

    #[error("Error in stream creation: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Error in stream start: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Handle on the default output device
pub struct AudioOutput {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    channels: usize,
    click_tx: Option<ClickProducer>,
}

impl AudioOutput {
    /// Open the default output device and start a silent stream
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let (click_tx, click_rx) = create_click_channel(CLICK_QUEUE_CAPACITY);
        let voice = ClickVoice::new(sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, click_rx, voice)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, click_rx, voice)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, click_rx, voice)
            }
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        log::info!("Audio output started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            channels,
            click_tx: Some(click_tx),
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sending side of the click queue; only the first caller gets it
    pub fn click_sink(&mut self) -> Option<CpalClickSink> {
        self.click_tx.take().map(|producer| CpalClickSink { producer })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut click_rx: ClickConsumer,
        mut voice: ClickVoice,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Latest queued click wins
                while let Some(request) = click_rx.try_pop() {
                    voice.trigger(request);
                }

                for frame in data.chunks_mut(channels) {
                    let value: T = T::from_sample(voice.next_sample());
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

/// `ClickSink` feeding the cpal callback
pub struct CpalClickSink {
    producer: ClickProducer,
}

impl ClickSink for CpalClickSink {
    fn play(&mut self, click: ClickType, sound: SoundType, gain: f32) {
        let request = ClickRequest { click, sound, gain };
        if self.producer.try_push(request).is_err() {
            log::debug!("Click queue full, dropping {:?} click", click);
        }
    }
}
