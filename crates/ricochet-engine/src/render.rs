//! Read-only render extraction.
//!
//! The engine never draws. [`collect_render_items`] snapshots every visible
//! `Transform + Renderer` entity into plain [`RenderItem`]s, and [`draw`]
//! replays them onto any [`Canvas`] the host provides. Both take `&World`,
//! so rendering cannot mutate game state.
//!
//! This is a pure function of world state, suitable for headless testing.

use ricochet_ecs::prelude::*;

/// Whether items are sorted before being handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Entity id order.
    #[default]
    Unsorted,
    /// `z_index` ascending; ties keep entity id order.
    ByZIndex,
}

/// Everything a renderer needs for one entity.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub entity: EntityId,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub renderer: Renderer,
}

/// Visible renderable entities of `world`.
pub fn collect_render_items(world: &World, order: RenderOrder) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = world
        .query(&[ComponentKind::Transform, ComponentKind::Renderer])
        .into_iter()
        .filter_map(|entity| {
            let t = world.get::<Transform>(entity)?;
            let r = world.get::<Renderer>(entity)?;
            r.visible.then(|| RenderItem {
                entity,
                x: t.x,
                y: t.y,
                rotation: t.rotation,
                scale: t.scale,
                renderer: r.clone(),
            })
        })
        .collect();
    if order == RenderOrder::ByZIndex {
        items.sort_by_key(|item| item.renderer.z_index);
    }
    items
}

/// Draw a single item. A custom draw hook replaces the default shape.
pub fn draw_item(canvas: &mut dyn Canvas, item: &RenderItem) {
    if let Some(hook) = &item.renderer.custom_draw {
        hook(canvas, item.x, item.y, item.rotation, item.scale);
        return;
    }
    let color = item.renderer.color;
    match &item.renderer.visual {
        Visual::Circle { radius } => canvas.circle(item.x, item.y, radius * item.scale, color),
        Visual::Rectangle { width, height } => canvas.rectangle(
            item.x,
            item.y,
            width * item.scale,
            height * item.scale,
            item.rotation,
            color,
        ),
        Visual::Polygon { points } => {
            let scaled: Vec<(f64, f64)> = points
                .iter()
                .map(|&(px, py)| (px * item.scale, py * item.scale))
                .collect();
            canvas.polygon(item.x, item.y, &scaled, item.rotation, color);
        }
        Visual::Sprite { sheet, frame } => {
            canvas.sprite(item.x, item.y, sheet, *frame, item.rotation, item.scale);
        }
    }
}

/// Draw every visible entity, lowest `z_index` first. Returns the number of
/// items drawn.
pub fn draw(world: &World, canvas: &mut dyn Canvas) -> usize {
    let items = collect_render_items(world, RenderOrder::ByZIndex);
    for item in &items {
        draw_item(canvas, item);
    }
    items.len()
}
