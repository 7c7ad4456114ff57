use std::{
    io::{self, BufRead},
    sync::Arc,
    thread,
};

use crossbeam_channel::{Receiver, select, unbounded};
use deck_engine::{App, AppDeps, AppOptions, Services};
use deck_hotkey::{ChannelSource, KeyFeed};
use deck_protocol::{MsgToUi, SlotFace, ipc::ui_channel};
use macroplay::LogInjector;
use tracing::{debug, info, warn};

use crate::{
    Loaded,
    console::{self, Line},
};

/// Run the app until `:quit` or end of input. Returns the exit code.
pub fn run(loaded: Loaded) -> i32 {
    let (feed, source) = ChannelSource::new();
    let (ui_tx, ui_rx) = ui_channel();
    let deps = AppDeps {
        source: Arc::new(source),
        injector: Arc::new(LogInjector),
        services: Services::offline(),
        ui: ui_tx,
    };
    let opts = AppOptions {
        macro_hold: loaded.settings.macro_hold(),
        ui_queue_capacity: loaded.settings.ui_queue_capacity,
        save_path: loaded.save_path,
    };
    let mut app = match App::new(loaded.catalog, loaded.layout, loaded.decoded, deps, opts) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    let lines = match spawn_stdin() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("Failed to read stdin: {e}");
            return 1;
        }
    };

    let tasks = app.queue().receiver().clone();
    loop {
        select! {
            recv(ui_rx) -> msg => match msg {
                Ok(msg) => print_msg(&msg),
                Err(_) => break,
            },
            recv(tasks) -> task => match task {
                Ok(task) => {
                    if let Err(e) = app.handle(task) {
                        warn!(error = %e, "ui_task_failed");
                    }
                }
                Err(_) => break,
            },
            recv(lines) -> line => {
                let Ok(line) = line else { break };
                if !apply(&mut app, &feed, &line) {
                    break;
                }
            },
        }
    }

    app.wait_workers();
    app.pump();
    let code = match app.save() {
        Ok(saved) => {
            debug!(saved, "final_save");
            0
        }
        Err(e) => {
            eprintln!("Save failed: {e}");
            1
        }
    };
    app.shutdown();
    while let Ok(msg) = ui_rx.try_recv() {
        print_msg(&msg);
    }
    info!("headless_exit");
    code
}

/// Forward stdin lines to a channel on a named thread.
fn spawn_stdin() -> io::Result<Receiver<String>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("deck-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Act on one input line. Returns false to stop.
fn apply(app: &mut App, feed: &KeyFeed, line: &str) -> bool {
    let parsed = match console::parse(line) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{e}");
            return true;
        }
    };
    let result = match parsed {
        Line::Empty => Ok(()),
        Line::Quit => return false,
        Line::Key(chord) => {
            if !feed.tap(chord) {
                eprintln!("hotkey listener is not running");
            }
            Ok(())
        }
        Line::Click(slot) => app.click(slot),
        Line::View(ix) => app.open_view(ix),
        Line::Faces => {
            for f in app.faces() {
                print_face(&f);
            }
            Ok(())
        }
        Line::Save => app.save().map(|saved| {
            if saved {
                println!("saved");
            } else {
                println!("no save path");
            }
        }),
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
    true
}

/// Print a UI message.
fn print_msg(msg: &MsgToUi) {
    match msg {
        MsgToUi::ViewChanged { index, name, slots } => {
            println!("[view {index}] {name}");
            slots.iter().for_each(print_face);
        }
        MsgToUi::SlotsChanged { slots } => slots.iter().for_each(print_face),
        MsgToUi::ViewsChanged { names } => println!("views: {}", names.join(", ")),
        MsgToUi::Selected { slot } => println!("selected slot {slot}"),
        MsgToUi::HotkeyTriggered { slot, combo } => println!("hotkey {combo} -> slot {slot}"),
        MsgToUi::Notify { kind, title, text } => println!("{kind:?}: {title}: {text}"),
        MsgToUi::ClearNotifications => {}
    }
}

/// Print one slot line.
fn print_face(f: &SlotFace) {
    let mut flags = String::new();
    if f.locked {
        flags.push_str(" locked");
    }
    if f.shared {
        flags.push_str(" shared");
    }
    if let Some(img) = &f.image {
        flags.push_str(" image=");
        flags.push_str(img);
    }
    println!("  {:>2} {:<35} {}{flags}", f.slot, f.text, f.fill);
}
