use std::path::{Path, PathBuf};

use notify::{recommended_watcher, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::logging;

/// Watches for changes to the ibases list, including its creation and removal.
///
/// The watch sits on the deepest directory on the file's path that exists, which is
/// normally its parent. When the parent is missing (no 1C starter has run yet) an
/// ancestor is watched instead, and every event that creates or removes a directory
/// on the path is reported so the owner can call [`ConfigWatcher::rearm`]. The watch
/// stops when this value is dropped.
pub struct ConfigWatcher {
    watcher: RecommendedWatcher,
    target: PathBuf,
    watched: PathBuf,
}

impl ConfigWatcher {
    pub fn start<F>(target: &Path, on_change: F) -> notify::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let target = absolute(target);
        let watched = nearest_existing_dir(&target);

        let filter_target = target.clone();
        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if is_relevant(&event, &filter_target) {
                    on_change();
                }
            }
            Err(error) => logging::warn("config watcher error", &[("error", error.to_string())]),
        })?;
        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        logging::info(
            "config watch started",
            &[
                ("target", target.display().to_string()),
                ("dir", watched.display().to_string()),
            ],
        );
        Ok(Self {
            watcher,
            target,
            watched,
        })
    }

    /// Moves the watch to the deepest existing directory on the target's path.
    /// Returns `true` when the watched directory changed.
    pub fn rearm(&mut self) -> notify::Result<bool> {
        let anchor = nearest_existing_dir(&self.target);
        if anchor == self.watched {
            return Ok(false);
        }

        // The old directory may already be gone, which drops its watch anyway.
        let _ = self.watcher.unwatch(&self.watched);
        self.watcher.watch(&anchor, RecursiveMode::NonRecursive)?;
        logging::info(
            "config watch moved",
            &[
                ("from", self.watched.display().to_string()),
                ("to", anchor.display().to_string()),
            ],
        );
        self.watched = anchor;
        Ok(true)
    }

    pub fn watched_dir(&self) -> &Path {
        &self.watched
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn nearest_existing_dir(target: &Path) -> PathBuf {
    target
        .parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// An event matters when it touches the target file itself or a directory on the
/// way to it.
fn is_relevant(event: &notify::Event, target: &Path) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    );
    kind_matches && event.paths.iter().any(|path| target.starts_with(path))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};
    use notify::{Event, EventKind};

    use super::{is_relevant, nearest_existing_dir, ConfigWatcher};

    fn temp_root(label: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "onec-search-{label}-{}-{unique}",
            std::process::id()
        ));
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn only_events_touching_the_target_file_are_relevant() {
        let target = Path::new("/home/u/.1C/1cestart/ibases.v8i");
        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/home/u/.1C/1cestart/ibases.v8i"));
        let removed_other = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/home/u/.1C/1cestart/1cestart.cfg"));
        let accessed = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/home/u/.1C/1cestart/ibases.v8i"));
        let renamed_into_place = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/home/u/.1C/1cestart/ibases.v8i.tmp"))
            .add_path(PathBuf::from("/home/u/.1C/1cestart/ibases.v8i"));

        assert!(is_relevant(&created, target));
        assert!(!is_relevant(&removed_other, target));
        assert!(!is_relevant(&accessed, target));
        assert!(is_relevant(&renamed_into_place, target));
    }

    #[test]
    fn directories_on_the_target_path_are_relevant() {
        let target = Path::new("/home/u/.1C/1cestart/ibases.v8i");
        let made_parent = Event::new(EventKind::Create(CreateKind::Folder))
            .add_path(PathBuf::from("/home/u/.1C"));
        let made_sibling = Event::new(EventKind::Create(CreateKind::Folder))
            .add_path(PathBuf::from("/home/u/.cache"));
        let dropped_dir = Event::new(EventKind::Remove(RemoveKind::Folder))
            .add_path(PathBuf::from("/home/u/.1C/1cestart"));

        assert!(is_relevant(&made_parent, target));
        assert!(!is_relevant(&made_sibling, target));
        assert!(is_relevant(&dropped_dir, target));
    }

    #[test]
    fn nearest_existing_dir_walks_up_to_an_existing_ancestor() {
        let root = temp_root("watch-anchor");
        let target = root.join("a").join("b").join("ibases.v8i");

        assert_eq!(nearest_existing_dir(&target), root);

        std::fs::create_dir_all(root.join("a")).unwrap();
        assert_eq!(nearest_existing_dir(&target), root.join("a"));

        std::fs::create_dir_all(root.join("a").join("b")).unwrap();
        assert_eq!(nearest_existing_dir(&target), root.join("a").join("b"));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn starts_without_parent_and_follows_it_once_created() {
        use std::sync::mpsc;
        use std::time::Duration;

        let root = temp_root("watch-missing-parent");
        let parent = root.join("1C").join("1cestart");
        let target = parent.join("ibases.v8i");

        let (tx, rx) = mpsc::channel();
        let mut watcher = ConfigWatcher::start(&target, move || {
            let _ = tx.send(());
        })
        .expect("watcher starts on an existing ancestor");
        assert_eq!(watcher.watched_dir(), root.as_path());

        std::fs::create_dir_all(&parent).unwrap();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("directory creation is reported");
        assert!(watcher.rearm().unwrap());
        assert_eq!(watcher.watched_dir(), parent.as_path());
        while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

        std::fs::write(&target, "[Trade]\nConnect=File=\"/srv/trade\";\n").unwrap();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("file creation is reported after rearm");
        assert!(!watcher.rearm().unwrap());

        drop(watcher);
        std::fs::remove_dir_all(&root).unwrap();
    }
}
