use anyhow::Result;
use log::{debug, error, info};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod engine;

use engine::input::{BindKinds, EventFlow, InputManager, InputSettings};

const SETTINGS_PATH: &str = "config/input.toml";

/// Action the demo rebinds from its hotkeys
const REBIND_TARGET: &str = "Jump";

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Input...");

    let settings = InputSettings::load_or_default(SETTINGS_PATH);
    let mut input = InputManager::new(settings);

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rusted Input")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");
    info!("F1: rebind {REBIND_TARGET} (keyboard/mouse), F2: rebind {REBIND_TARGET} (joystick), F3: cancel, F5: save, F6: reset binds");

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    if let Err(e) = input.save() {
                        error!("Failed to save input profile: {}", e);
                    }
                    elwt.exit();
                }
                WindowEvent::RedrawRequested => {
                    // One input frame per redraw
                    input.update();
                    log_actions(&input);
                }
                other => {
                    // Host hotkeys take priority over gameplay and rebinds
                    if let Some(key) = hotkey(&other) {
                        run_hotkey(&mut input, key);
                        return;
                    }
                    if let Some(EventFlow::Rebound(outcome)) = input.process_window_event(&other) {
                        info!(
                            "{} now on {} (evicted from {:?})",
                            outcome.action, outcome.bind, outcome.evicted
                        );
                    }
                }
            },
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}

/// Function key pressed in this event, if it is one of the demo hotkeys
fn hotkey(event: &WindowEvent) -> Option<KeyCode> {
    let WindowEvent::KeyboardInput { event, .. } = event else {
        return None;
    };
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    match event.physical_key {
        PhysicalKey::Code(
            key @ (KeyCode::F1 | KeyCode::F2 | KeyCode::F3 | KeyCode::F5 | KeyCode::F6),
        ) => Some(key),
        _ => None,
    }
}

fn run_hotkey(input: &mut InputManager, key: KeyCode) {
    let result = match key {
        KeyCode::F1 => input.begin_rebind(REBIND_TARGET, 0, BindKinds::KEYBOARD_MOUSE, true),
        KeyCode::F2 => input.begin_rebind(REBIND_TARGET, 0, BindKinds::JOYSTICK, true),
        KeyCode::F3 => {
            input.cancel_rebind();
            Ok(())
        }
        KeyCode::F5 => input.save(),
        KeyCode::F6 => {
            input.reset_action_keys();
            Ok(())
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        error!("{}", e);
    }
}

fn log_actions(input: &InputManager) {
    for action in input.actions().iter() {
        let name = action.name.as_str();
        if input.is_action_pressed(name) {
            info!("{} pressed (value {:.2})", name, input.action_value(name));
        } else if input.is_action_released(name) {
            info!("{} released", name);
        }
    }

    if let Some(c) = input.last_char() {
        debug!("Typed {:?}", c);
    }
    if input.wheel_moved() {
        debug!("Wheel {:?}", input.wheel_direction());
    }
}
