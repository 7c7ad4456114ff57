//! Shuffled playlists for the shuffle action.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::{Error, MediaPlayer, NotificationDispatcher};

/// Every `.mp3` below `dir`, in random order.
pub fn playlist(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    collect(dir, &mut out)?;
    out.shuffle(&mut rand::rng());
    Ok(out)
}

/// Recursive walk.
fn collect(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mp3"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Index `dir` on a worker thread and hand the shuffled list to `media`.
///
/// The worker only talks to the media player and the notification channel.
pub fn start(
    media: Arc<dyn MediaPlayer>,
    notifier: NotificationDispatcher,
    dir: PathBuf,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("deck-shuffle".into())
        .spawn(move || {
            let tracks = match playlist(&dir) {
                Ok(t) => t,
                Err(e) => return notifier.report("Shuffle", &Error::Io(e)),
            };
            if tracks.is_empty() {
                debug!(dir = %dir.display(), "shuffle_empty");
                if notifier
                    .send_warn("Shuffle", format!("No tracks in {}", dir.display()))
                    .is_err()
                {
                    debug!("notification_dropped");
                }
                return;
            }
            let count = tracks.len();
            match media.enqueue(tracks) {
                Ok(()) => {
                    info!(dir = %dir.display(), count, "shuffle_started");
                    if notifier
                        .send_info("Shuffle", format!("Playing {count} tracks"))
                        .is_err()
                    {
                        debug!("notification_dropped");
                    }
                }
                Err(e) => notifier.report("Shuffle", &Error::Service(e)),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_mp3s_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("album");
        fs::create_dir(&sub).unwrap();
        for p in [
            dir.path().join("a.mp3"),
            dir.path().join("cover.jpg"),
            sub.join("b.MP3"),
            sub.join("c.mp3"),
        ] {
            fs::write(p, b"").unwrap();
        }
        let mut got: Vec<String> = playlist(dir.path())
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        got.sort();
        assert_eq!(got, vec!["a.mp3", "b.MP3", "c.mp3"]);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(playlist(&dir.path().join("nope")).is_err());
    }
}
