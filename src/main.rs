use std::thread;

use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use meander::{build_app, MountSurface, TopicOutbox};

fn main() -> AppExit {
    let (outbox, topics) = TopicOutbox::channel();

    // Stand-in for the markdown viewer: report what would be opened. The
    // thread ends when the app drops the outbox on exit.
    thread::spawn(move || {
        for topic in topics.iter() {
            info!("Viewer: {} -> {}", topic.display_name, topic.content_reference);
        }
    });

    let mut app = build_app(MountSurface::default());
    app.insert_resource(outbox)
        .add_plugins(WorldInspectorPlugin::new());
    app.run()
}
