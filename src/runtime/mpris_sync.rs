use crate::app::App;
use crate::mpris::MprisHandle;
use crate::player::PlaybackController;

/// Push the full now-playing picture at MPRIS: track metadata, playback
/// status and current position.
pub fn update_mpris(mpris: &MprisHandle, app: &App, player: &PlaybackController) {
    let index = app.now_playing();
    let item = index.and_then(|i| app.item(i));
    mpris.set_track_metadata(index, item);
    mpris.set_playback(app.playback);
    mpris.set_position(player.current_time());
}
