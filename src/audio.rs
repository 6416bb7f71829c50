use crate::constants::{
    ATTACK_SEC, MASTER_GAIN, RELEASE_STOP_AFTER_SEC, RELEASE_TAU_SEC, TONE_LOWPASS_HZ,
    VOICE_PEAK_GAIN,
};
use synth_core::{AudioEngine, Pitch, UnlockError};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn create_gain(
    audio_ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> Result<web::GainNode, ()> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("{} GainNode error: {:?}", label, e);
            Err(())
        }
    }
}

/// Context plus the fixed output chain: voice -> tone -> master -> destination.
struct Graph {
    ctx: web::AudioContext,
    master: web::GainNode,
    tone: web::BiquadFilterNode,
}

impl Graph {
    fn new() -> Result<Self, ()> {
        let ctx = web::AudioContext::new().map_err(|e| {
            log::error!("[audio] AudioContext error: {:?}", e);
        })?;
        let master = create_gain(&ctx, MASTER_GAIN, "Master")?;
        let tone = web::BiquadFilterNode::new(&ctx).map_err(|e| {
            log::error!("BiquadFilterNode error: {:?}", e);
        })?;
        tone.set_type(web::BiquadFilterType::Lowpass);
        tone.frequency().set_value(TONE_LOWPASS_HZ);
        _ = tone.connect_with_audio_node(&master);
        _ = master.connect_with_audio_node(&ctx.destination());
        Ok(Self { ctx, master, tone })
    }
}

struct Voice {
    osc: web::OscillatorNode,
    gain: web::GainNode,
    midi: u8,
}

impl Voice {
    fn start(graph: &Graph, pitch: &Pitch, velocity: f32) -> Result<Self, ()> {
        let osc = web::OscillatorNode::new(&graph.ctx).map_err(|e| {
            log::error!("OscillatorNode error: {:?}", e);
        })?;
        osc.set_type(web::OscillatorType::Triangle);
        osc.frequency().set_value(pitch.frequency_hz());
        let gain = create_gain(&graph.ctx, 0.0, "Voice")?;
        let t0 = graph.ctx.current_time();
        _ = gain
            .gain()
            .linear_ramp_to_value_at_time(VOICE_PEAK_GAIN * velocity, t0 + ATTACK_SEC);
        _ = osc.connect_with_audio_node(&gain);
        _ = gain.connect_with_audio_node(&graph.tone);
        _ = osc.start_with_when(t0);
        Ok(Self {
            osc,
            gain,
            midi: pitch.midi(),
        })
    }

    fn stop(self, ctx: &web::AudioContext) {
        let now = ctx.current_time();
        let param = self.gain.gain();
        _ = param.cancel_scheduled_values(now);
        _ = param.set_value_at_time(param.value(), now);
        _ = param.set_target_at_time(0.0, now, RELEASE_TAU_SEC);
        _ = self.osc.stop_with_when(now + RELEASE_STOP_AFTER_SEC);
    }
}

/// Monophonic WebAudio voice behind the keyboard.
///
/// The context is created up front (suspended until a gesture resumes it). If
/// creating it fails, the next unlock attempt tries again.
pub struct WebAudioSynth {
    graph: Option<Graph>,
    voice: Option<Voice>,
}

impl WebAudioSynth {
    pub fn new() -> Self {
        Self {
            graph: Graph::new().ok(),
            voice: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.graph
            .as_ref()
            .is_some_and(|g| g.ctx.state() == web::AudioContextState::Running)
    }

    /// Ask the browser to start audio. Must be called from a user gesture; the
    /// returned promise is awaited with [`await_unlock`].
    pub fn resume(&mut self) -> Result<js_sys::Promise, UnlockError> {
        if self.graph.is_none() {
            self.graph = Some(Graph::new().map_err(|_| UnlockError::NoDevice)?);
        }
        let graph = self.graph.as_ref().ok_or(UnlockError::NoDevice)?;
        graph
            .ctx
            .resume()
            .map_err(|e| UnlockError::Blocked(format!("{:?}", e)))
    }
}

impl Default for WebAudioSynth {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn await_unlock(promise: js_sys::Promise) -> Result<(), UnlockError> {
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| UnlockError::Blocked(format!("{:?}", e)))
}

impl AudioEngine for WebAudioSynth {
    fn attack(&mut self, pitch: &Pitch, velocity: f32) {
        let Some(graph) = &self.graph else {
            return;
        };
        if self.voice.as_ref().is_some_and(|v| v.midi == pitch.midi()) {
            return;
        }
        if let Some(old) = self.voice.take() {
            old.stop(&graph.ctx);
        }
        self.voice = Voice::start(graph, pitch, velocity).ok();
    }

    fn release(&mut self) {
        if let (Some(graph), Some(voice)) = (&self.graph, self.voice.take()) {
            voice.stop(&graph.ctx);
        }
    }

    fn dispose(&mut self) {
        self.release();
        if let Some(graph) = self.graph.take() {
            _ = graph.master.disconnect();
            _ = graph.ctx.close();
            log::info!("[audio] context closed");
        }
    }
}
