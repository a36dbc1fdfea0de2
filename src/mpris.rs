use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::app::{NowPlaying, PlaybackState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.atelier";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        let _ = self.notify.send(());
    }

    /// Publish what the foreground source is playing; `None` clears it.
    pub fn set_now_playing(&self, now: Option<&NowPlaying>) {
        if let Ok(mut s) = self.state.lock() {
            match now {
                Some(np) => {
                    s.title = Some(np.title.clone());
                    s.artist = vec![np.client.clone()];
                    s.album = Some(np.kind.clone());
                    s.url = Some(format!("file://{}", np.path.display()));
                    s.length_micros = np
                        .duration
                        .map(|d| d.as_micros().min(i64::MAX as u128) as i64);
                    s.track_id = track_object_path(np.index);
                }
                None => {
                    s.title = None;
                    s.artist.clear();
                    s.album = None;
                    s.url = None;
                    s.length_micros = None;
                    s.track_id = None;
                }
            }
        }
        let _ = self.notify.send(());
    }
}

fn track_object_path(index: Option<usize>) -> Option<OwnedObjectPath> {
    let path = match index {
        Some(i) => format!("{OBJECT_PATH}/track/{i}"),
        None => format!("{OBJECT_PATH}/track/foreground"),
    };
    ObjectPath::try_from(path).ok().map(OwnedObjectPath::from)
}

fn owned<'a>(value: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(value.into()).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "atelier"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };

        put(
            "mpris:trackid",
            s.track_id.clone().and_then(|p| owned(p.into_inner())),
        );
        put("xesam:title", owned(s.title.clone().unwrap_or_default()));
        if !s.artist.is_empty() {
            put("xesam:artist", owned(s.artist.clone()));
        }
        if let Some(album) = s.album.clone() {
            put("xesam:album", owned(album));
        }
        if let Some(url) = s.url.clone() {
            put("xesam:url", owned(url));
        }
        if let Some(len) = s.length_micros {
            put("mpris:length", owned(len));
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("atelier-mpris".into())
        .spawn(move || {
            block_on(async move {
                if let Err(e) = serve(tx, state_for_thread, notify_rx).await {
                    warn!("MPRIS unavailable: {e}");
                }
            });
        });
    if let Err(e) = spawned {
        warn!("MPRIS: failed to spawn service thread: {e}");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(OBJECT_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    debug!("MPRIS service registered");

    let player: InterfaceRef<PlayerIface> = object_server.interface(OBJECT_PATH).await?;

    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut changed = false;
        while notify.try_recv().is_ok() {
            changed = true;
        }
        if !changed {
            continue;
        }

        let iface = player.get().await;
        let emitter = player.signal_emitter();
        if let Err(e) = iface.playback_status_changed(emitter).await {
            debug!("MPRIS: playback status signal failed: {e}");
        }
        if let Err(e) = iface.metadata_changed(emitter).await {
            debug!("MPRIS: metadata signal failed: {e}");
        }
    }
}
