use serde::{Deserialize, Serialize};

use crate::error::BinvizCommonError;

/// Role of a brush inside a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushRole {
    /// Every row of the bin
    All,
    /// Rows selected by two or more user brushes
    Overlap,
    /// Rows selected by no user brush
    Rest,
    /// A brush created by the user
    User,
}

impl BrushRole {
    pub fn is_reserved(&self) -> bool {
        !matches!(self, BrushRole::User)
    }
}

/// A named subset of rows, addressed in results by `index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub role: BrushRole,
    pub index: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<[f32; 4]>,
}

impl Brush {
    pub fn new(role: BrushRole, index: i32) -> Self {
        Self {
            role,
            index,
            name: None,
            color: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Linear scan for the brush holding `role`
pub fn find_role(brushes: &[Brush], role: BrushRole) -> Option<&Brush> {
    brushes.iter().find(|b| b.role == role)
}

/// Checks that every reserved role occurs at most once
pub fn validate_roles(brushes: &[Brush]) -> Result<(), BinvizCommonError> {
    for role in [BrushRole::All, BrushRole::Overlap, BrushRole::Rest] {
        if brushes.iter().filter(|b| b.role == role).count() > 1 {
            return Err(BinvizCommonError::DuplicateBrushRole(role));
        }
    }
    Ok(())
}

/// Brushes in draw order: All, then Overlap, then every other brush in
/// result order
pub fn draw_order(brushes: &[Brush]) -> Vec<&Brush> {
    let mut ordered = Vec::with_capacity(brushes.len());
    ordered.extend(find_role(brushes, BrushRole::All));
    ordered.extend(find_role(brushes, BrushRole::Overlap));
    ordered.extend(
        brushes
            .iter()
            .filter(|b| !matches!(b.role, BrushRole::All | BrushRole::Overlap)),
    );
    ordered
}
