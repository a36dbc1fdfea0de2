use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let now = app.now_playing();
    mpris.set_now_playing(now.as_ref());
    mpris.set_playback(app.playback_state());
}
