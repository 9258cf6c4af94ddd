//! **pathwright-scene** — a concrete scene for the pathwright engine.
//!
//! [`WallScene`] keeps a [`WallSet`] on either a grid or a gridless map and
//! implements [`pathwright_paths::Scene`] on top of it: grid steps are
//! tested against the walls that block the token's layer, and gridless
//! requests are answered by a [`VisibilityGraph`] built per token
//! footprint.
//!
//! ```
//! use pathwright_core::{Point, Token, Vec2};
//! use pathwright_paths::{PathConfig, Pathfinder, SquareGrid};
//! use pathwright_scene::{Wall, WallScene, WallSet};
//!
//! let walls: WallSet = [Wall::new(Vec2::new(200.0, 0.0), Vec2::new(200.0, 300.0))]
//!     .into_iter()
//!     .collect();
//! let scene = WallScene::grid(SquareGrid::new(5, 5, 100.0), walls);
//! let mut pf = Pathfinder::new(PathConfig::default());
//! let path = pf
//!     .find_grid_path(&scene, Point::new(1, 1), Point::new(3, 1), &Token::medium(), &[])
//!     .unwrap()
//!     .unwrap();
//! assert!(path.cost() > 2.0);
//! ```

mod scene;
mod visibility;
mod walls;

pub use scene::WallScene;
pub use visibility::{MIN_CLEARANCE, VisibilityGraph};
pub use walls::{DoorState, DoorType, MoveRestriction, Wall, WallHeight, WallSet};
