/// Where the mark's tooltip is and what it shows. Rendering it is up to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    /// Sticky tooltips were opened by a click and ignore pointer moves
    pub sticky: bool,
    pub index: Option<usize>,
    pub position: [f32; 2],
}

impl TooltipState {
    pub fn show(&mut self, index: Option<usize>, position: [f32; 2], sticky: bool) {
        self.visible = true;
        self.sticky = sticky;
        self.index = index;
        self.position = position;
    }

    pub fn move_to(&mut self, position: [f32; 2]) {
        if self.visible && !self.sticky {
            self.position = position;
        }
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }
}
