//! Reference-counted sound resource manager
//!
//! Tracks are cached by filename and stay in memory only while they have
//! subscribers; the last `release` unloads them. The manager is an
//! explicitly constructed service object passed to whoever needs it, never
//! a process-wide singleton, so its lifetime is visible and testable.
//!
//! Audio is cosmetic: a track that fails to load is remembered as
//! unavailable and playback requests for it are silently skipped.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, warn};

/// Opaque handle identifying who holds a track (entity id, screen tag, ...)
pub type SubscriberId = u64;

/// Which volume channel a track plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Sfx,
    Music,
}

/// Playback backend. The core never touches an audio device directly.
pub trait AudioSink {
    /// Attempt to load a track; false when missing or undecodable
    fn load(&mut self, name: &str) -> bool;
    fn unload(&mut self, name: &str);
    fn play(&mut self, name: &str, volume: f32);
    fn set_volume(&mut self, name: &str, volume: f32);
}

/// Backend that discards playback. Lets headless hosts and tests run
/// without an audio device.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn load(&mut self, name: &str) -> bool {
        debug!("null sink: load \"{}\"", name);
        true
    }

    fn unload(&mut self, name: &str) {
        debug!("null sink: unload \"{}\"", name);
    }

    fn play(&mut self, name: &str, volume: f32) {
        debug!("null sink: play \"{}\" at volume {:.3}", name, volume);
    }

    fn set_volume(&mut self, _name: &str, _volume: f32) {}
}

/// A cached track and the parties using it
struct Resource {
    subscribers: HashSet<SubscriberId>,
    /// False when the backend failed to load the track
    loaded: bool,
}

/// Per-channel volume levels, each 0.0 - 1.0
struct Volumes {
    sfx: f32,
    music: f32,
    master: f32,
}

/// Provides access to sound resources and plays them at the right volume
pub struct SoundManager {
    sink: Box<dyn AudioSink>,
    sfx: HashMap<String, Resource>,
    music: HashMap<String, Resource>,
    volumes: Volumes,
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl SoundManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            sfx: HashMap::new(),
            music: HashMap::new(),
            volumes: Volumes {
                sfx: 1.0,
                music: 1.0,
                master: 1.0,
            },
        }
    }

    /// Load-or-reuse a track and register a subscriber for it
    pub fn acquire(&mut self, channel: Channel, source: &str, subscriber: SubscriberId) {
        let name = basename(source);
        let volume = self.channel_volume(channel);

        let table = self.table_mut(channel);
        if let Some(resource) = table.get_mut(&name) {
            resource.subscribers.insert(subscriber);
            return;
        }

        let loaded = self.sink.load(&name);
        if loaded {
            self.sink.set_volume(&name, volume);
        } else {
            warn!("failed to load \"{}\"; playback will be skipped", name);
        }
        self.table_mut(channel).insert(
            name,
            Resource {
                subscribers: HashSet::from([subscriber]),
                loaded,
            },
        );
    }

    /// Deregister a subscriber; the track unloads once nobody holds it
    pub fn release(&mut self, channel: Channel, source: &str, subscriber: SubscriberId) {
        let name = basename(source);
        let table = self.table_mut(channel);
        let Some(resource) = table.get_mut(&name) else {
            warn!("release of untracked track \"{}\"", name);
            return;
        };
        resource.subscribers.remove(&subscriber);
        if resource.subscribers.is_empty() {
            let loaded = resource.loaded;
            table.remove(&name);
            if loaded {
                self.sink.unload(&name);
            }
            debug!("unloaded \"{}\" (no subscribers left)", name);
        }
    }

    /// Play an acquired track at the channel's effective volume
    pub fn play(&mut self, channel: Channel, source: &str) {
        let name = basename(source);
        let volume = self.channel_volume(channel);
        let table = match channel {
            Channel::Sfx => &self.sfx,
            Channel::Music => &self.music,
        };
        match table.get(&name) {
            Some(resource) if resource.loaded => self.sink.play(&name, volume),
            Some(_) => debug!("skipping \"{}\": track unavailable", name),
            None => warn!("\"{}\" was never acquired; nothing to play", name),
        }
    }

    /// Effective sfx volume (sfx channel blended with master)
    pub fn sfx_volume(&self) -> f32 {
        Self::scale(&[self.volumes.sfx, self.volumes.master])
    }

    /// Effective music volume (music channel blended with master)
    pub fn music_volume(&self) -> f32 {
        Self::scale(&[self.volumes.music, self.volumes.master])
    }

    pub fn master_volume(&self) -> f32 {
        self.volumes.master
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.volumes.sfx = volume.clamp(0.0, 1.0);
        self.apply_volume(Channel::Sfx);
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.volumes.music = volume.clamp(0.0, 1.0);
        self.apply_volume(Channel::Music);
    }

    /// Master scales everything, so both caches get re-volumed
    pub fn set_master_volume(&mut self, volume: f32) {
        self.volumes.master = volume.clamp(0.0, 1.0);
        self.apply_volume(Channel::Sfx);
        self.apply_volume(Channel::Music);
    }

    /// Combine independent volume levels into one. Rolls off smoothly and
    /// slowly: preserves a lot of the volume, but is still zero whenever
    /// any input is zero.
    ///
    /// f(v1..vn) = sqrt(n * v1 * v2 * ... * vn) / sqrt(n)
    pub fn scale(volumes: &[f32]) -> f32 {
        let product: f32 = volumes.iter().product();
        let n = volumes.len() as f32;
        let scaled = (n * product).sqrt() / n.sqrt();
        debug!("volume set {:?} scales to {:.3}", volumes, scaled);
        scaled
    }

    fn channel_volume(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Sfx => self.sfx_volume(),
            Channel::Music => self.music_volume(),
        }
    }

    fn table_mut(&mut self, channel: Channel) -> &mut HashMap<String, Resource> {
        match channel {
            Channel::Sfx => &mut self.sfx,
            Channel::Music => &mut self.music,
        }
    }

    fn apply_volume(&mut self, channel: Channel) {
        let volume = self.channel_volume(channel);
        let table = match channel {
            Channel::Sfx => &self.sfx,
            Channel::Music => &self.music,
        };
        for (name, resource) in table {
            if resource.loaded {
                self.sink.set_volume(name, volume);
            }
        }
    }
}

/// Tracks are keyed by filename regardless of the path they came in with
fn basename(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_owned())
}
