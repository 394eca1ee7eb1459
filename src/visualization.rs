//! Interactive 3D cube viewer using kiss3d.

use std::time::{Duration, Instant};

use kiss3d::prelude::*;

use twisty::animation::{AnimationQueue, Frame, Matrix3, VisualPiece};
use twisty::persistence;
use twisty::pieces::Palette;
use twisty::CubeState;

/// Body edge length relative to a slot.
const BODY_SIZE: f32 = 0.96;
/// Sticker edge length relative to a slot.
const TILE_SIZE: f32 = 0.82;
const TILE_THICKNESS: f32 = 0.04;
/// Distance from a piece center to its sticker tiles, relative to a slot.
const TILE_OFFSET: f32 = 0.49;

/// How long the demo leaves the cube at rest before its next scramble or solve.
const DEMO_PAUSE: Duration = Duration::from_secs(6);

/// Paces the demo: fires once the animation has been idle for a full pause.
#[derive(Debug, Default)]
struct DemoTimer {
    idle_since: Option<Instant>,
}

impl DemoTimer {
    fn ready(&mut self, idle: bool, now: Instant) -> bool {
        if !idle {
            self.idle_since = None;
            return false;
        }
        let since = *self.idle_since.get_or_insert(now);
        if now.duration_since(since) >= DEMO_PAUSE {
            self.idle_since = None;
            return true;
        }
        false
    }
}

/// An axis-aligned box to draw, in scene units.
#[derive(Clone, Debug, PartialEq)]
struct Block {
    center: [f32; 3],
    size: [f32; 3],
    color: (f32, f32, f32),
}

fn rotate(m: &Matrix3, v: [f32; 3]) -> [f32; 3] {
    [0, 1, 2].map(|r| m[r][0] * v[0] + m[r][1] * v[1] + m[r][2] * v[2])
}

/// The body and sticker tiles of one piece.
///
/// `view` is the global rotation applied to the whole cube and `slot` the
/// edge length of one slot. Tiles lie flat against the axis their sticker
/// points closest to, which keeps mid-turn tiles readable without rotating
/// scene nodes.
fn piece_blocks(piece: &VisualPiece, view: &Matrix3, palette: &Palette, slot: f32) -> Vec<Block> {
    let body_center = rotate(view, piece.center).map(|c| c * slot);
    let mut blocks = vec![Block {
        center: body_center,
        size: [BODY_SIZE * slot; 3],
        color: (0.08, 0.08, 0.08),
    }];

    for sticker in piece.piece.stickers() {
        let (x, y, z) = sticker.home_face.normal();
        let direction = rotate(view, rotate(&piece.transform, [x as f32, y as f32, z as f32]));
        let flat_axis = (0..3)
            .max_by(|&a, &b| direction[a].abs().total_cmp(&direction[b].abs()))
            .unwrap_or(0);
        let mut size = [TILE_SIZE * slot; 3];
        size[flat_axis] = TILE_THICKNESS * slot;
        blocks.push(Block {
            center: [0, 1, 2].map(|i| body_center[i] + direction[i] * TILE_OFFSET * slot),
            size,
            color: palette.rgb(sticker.color).to_unit(),
        });
    }
    blocks
}

/// Adds every block of `frame` to the scene.
fn build_scene(
    scene: &mut SceneNode3d,
    frame: &Frame,
    view: &Matrix3,
    palette: &Palette,
    width: f32,
) -> Vec<SceneNode3d> {
    let slot = width / frame.layers.max(1) as f32;
    frame
        .pieces
        .iter()
        .flat_map(|piece| piece_blocks(piece, view, palette, slot))
        .map(|block| {
            let [w, h, d] = block.size;
            let (r, g, b) = block.color;
            let [x, y, z] = block.center;
            scene
                .add_cube(w, h, d)
                .set_color(Color::new(r, g, b, 1.0))
                .set_position(Vec3::new(x, y, z))
        })
        .collect()
}

/// Starts a queue showing the cube as it is now and routes its turns there.
fn attach_queue(state: &mut CubeState) -> AnimationQueue {
    let queue = AnimationQueue::spawn(state.grid(), state.config());
    state.attach_animation(queue.handle());
    queue
}

const CONTROLS: &str =
    "[Left/Right] step, [Up] scramble, [Down] solve, [R] reset, [S] save, [A] load";

fn title(state: &CubeState, autoplay: bool) -> String {
    let history = state.history();
    format!(
        "{} layers - move {}/{}{} - {CONTROLS}",
        state.layers(),
        history.cursor(),
        history.len(),
        if autoplay { " (demo)" } else { "" }
    )
}

/// Opens the viewer on `state` and runs until the window closes.
pub fn display(state: CubeState) {
    pollster::block_on(display_async(state));
}

async fn display_async(mut state: CubeState) {
    let palette = state.config().palette.clone();
    let mut queue = attach_queue(&mut state);
    let mut view = persistence::IDENTITY;
    // scramble and solve on a loop until the first key press
    let mut autoplay = true;
    let mut demo = DemoTimer::default();

    let mut window = Window::new(&title(&state, autoplay)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(state.width() * 2.5);

    let mut scene = SceneNode3d::empty();
    let light = state.width() * 2.0;
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(light, light, light));

    let mut shown = queue.frame();
    let mut nodes = build_scene(&mut scene, &shown, &view, &palette, state.width());
    let mut needs_rebuild = false;
    let mut needs_title = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action != Action::Press {
                    continue;
                }
                autoplay = false;
                match key {
                    Key::Left => {
                        state.step_back();
                    }
                    Key::Right => {
                        state.step_forward();
                    }
                    Key::Up => {
                        state.scramble();
                    }
                    Key::Down => {
                        if let Err(e) = state.solve() {
                            log::warn!("cannot solve: {e}");
                        }
                    }
                    Key::R => {
                        state.reset();
                        queue = attach_queue(&mut state);
                    }
                    Key::S => {
                        match persistence::save(persistence::DEFAULT_SAVE_FILE, &state, &view) {
                            Ok(()) => log::info!("saved to {}", persistence::DEFAULT_SAVE_FILE),
                            Err(e) => log::warn!("save failed: {e}"),
                        }
                    }
                    Key::A => match persistence::load(persistence::DEFAULT_SAVE_FILE) {
                        Ok((loaded, rotation)) => {
                            state = loaded;
                            view = rotation;
                            queue = attach_queue(&mut state);
                            needs_rebuild = true;
                            log::info!("loaded {}", persistence::DEFAULT_SAVE_FILE);
                        }
                        Err(e) => log::warn!("load failed: {e}"),
                    },
                    _ => {}
                }
                needs_title = true;
            }
        }

        if autoplay && demo.ready(queue.is_idle(), Instant::now()) {
            if state.is_solved() {
                state.scramble();
            } else if let Err(e) = state.solve() {
                log::warn!("demo stopped: {e}");
                autoplay = false;
            }
            needs_title = true;
        }

        if needs_title {
            window.set_title(&title(&state, autoplay));
            needs_title = false;
        }

        let frame = queue.frame();
        if needs_rebuild || frame != shown {
            for mut node in nodes.drain(..) {
                node.remove();
            }
            nodes = build_scene(&mut scene, &frame, &view, &palette, state.width());
            shown = frame;
            needs_rebuild = false;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twisty::Face;

    #[test]
    fn test_solved_corner_tiles_face_outward() {
        let state = CubeState::with_layers(2);
        let frame = Frame::still(state.grid());
        let palette = Palette::default();
        let corner = frame
            .pieces
            .iter()
            .find(|visual| visual.center.iter().all(|&c| c > 0.0))
            .unwrap();

        let blocks = piece_blocks(corner, &persistence::IDENTITY, &palette, 6.0);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].center, [3.0, 3.0, 3.0]);
        for (sticker, tile) in corner.piece.stickers().iter().zip(&blocks[1..]) {
            let (x, y, z) = sticker.home_face.normal();
            let axis = [x, y, z].iter().position(|&c| c != 0).unwrap();
            assert!(tile.size[axis] < tile.size[(axis + 1) % 3], "{:?}", sticker.home_face);
            assert!(tile.center[axis].abs() > blocks[0].center[axis].abs());
            assert_eq!(tile.color, palette.rgb(sticker.color).to_unit());
        }
    }

    #[test]
    fn test_view_rotation_moves_tiles() {
        let state = CubeState::with_layers(3);
        let frame = Frame::still(state.grid());
        let palette = Palette::default();
        let up_center = frame
            .pieces
            .iter()
            .find(|visual| {
                let stickers = visual.piece.stickers();
                stickers.len() == 1 && stickers[0].home_face == Face::Up
            })
            .unwrap();

        // quarter turn about z carries +y to -x
        let view = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let blocks = piece_blocks(up_center, &view, &palette, 4.0);
        assert_eq!(blocks[0].center, [-4.0, 0.0, 0.0]);
        assert!(blocks[1].center[0] < -4.0);
        assert!(blocks[1].size[0] < blocks[1].size[1]);
    }

    #[test]
    fn test_demo_waits_for_a_full_idle_pause() {
        let mut timer = DemoTimer::default();
        let start = Instant::now();
        assert!(!timer.ready(true, start));
        assert!(!timer.ready(true, start + DEMO_PAUSE / 2));
        assert!(timer.ready(true, start + DEMO_PAUSE));

        // a busy queue restarts the pause
        let later = start + DEMO_PAUSE * 2;
        assert!(!timer.ready(true, later));
        assert!(!timer.ready(false, later + DEMO_PAUSE / 2));
        assert!(!timer.ready(true, later + DEMO_PAUSE));
        assert!(timer.ready(true, later + DEMO_PAUSE * 2));
    }
}
