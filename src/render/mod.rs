//! The scene-graph boundary.
//!
//! The bridge never talks to a renderer directly; it drives whatever
//! implements [`RenderNode`]. Applications wrap their scene-graph node type
//! (sprite, layer, whatever) in the trait and can get it back through `Any`
//! downcasting for renderer-specific work such as sprite-frame switching or
//! scheduled actions, which stay outside this crate.

use std::any::Any;

use crate::foundation::math::Point2;

/// One node in the application's scene graph.
///
/// Rotation follows the scene-graph convention: degrees, clockwise
/// positive. [`crate::foundation::units::render_rotation`] converts from
/// simulation angles.
pub trait RenderNode: Any {
    /// Move the node to a render-space position.
    fn set_position(&mut self, position: Point2);

    /// Rotate the node, in degrees.
    fn set_rotation(&mut self, degrees: f32);

    /// Show or hide the node.
    fn set_visible(&mut self, visible: bool);

    /// Scale the node's graphics (not its physics shape).
    fn set_scale(&mut self, scale: f32);

    /// Remove the node from its parent. Called when the owning entity is
    /// torn down.
    fn detach_from_parent(&mut self);
}

/// Node for entities with no visual representation; ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNode;

impl RenderNode for NullNode {
    fn set_position(&mut self, _position: Point2) {}
    fn set_rotation(&mut self, _degrees: f32) {}
    fn set_visible(&mut self, _visible: bool) {}
    fn set_scale(&mut self, _scale: f32) {}
    fn detach_from_parent(&mut self) {}
}
