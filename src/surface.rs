// Copyright (c) 2026 rezky_nightky

// `None` means the element is gone; callers treat that as "nothing to draw".
pub trait Container {
    fn content_box(&self) -> Option<(u32, u32)>;
}

impl<C: Container + ?Sized> Container for &C {
    fn content_box(&self) -> Option<(u32, u32)> {
        (**self).content_box()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, container: &impl Container) -> bool {
        let Some((w, h)) = container.content_box() else {
            return false;
        };
        if (w, h) == (self.width, self.height) {
            return false;
        }
        self.width = w;
        self.height = h;
        true
    }
}
