/// ## Machine memory
///
/// A fixed run of byte cells and a pointer. Pointer movement wraps at both
/// ends and cell arithmetic wraps at 8 bits; nothing here can fault.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    ptr: usize,
}

impl Tape {
    pub fn new(len: usize) -> Tape {
        Tape {
            cells: vec![0; len.max(1)],
            ptr: 0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.ptr = 0;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pointer(&self) -> usize {
        self.ptr
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self) -> u8 {
        self.cells[self.ptr]
    }

    pub fn set(&mut self, val: u8) {
        self.cells[self.ptr] = val;
    }

    pub fn right(&mut self) {
        self.ptr = (self.ptr + 1) % self.cells.len();
    }

    pub fn left(&mut self) {
        self.ptr = if self.ptr == 0 {
            self.cells.len() - 1
        } else {
            self.ptr - 1
        };
    }

    pub fn inc(&mut self) {
        self.cells[self.ptr] = self.cells[self.ptr].wrapping_add(1);
    }

    pub fn dec(&mut self) {
        self.cells[self.ptr] = self.cells[self.ptr].wrapping_sub(1);
    }

    /// Hex window of `count` cells from `start`, the current cell bracketed.
    pub fn dump(&self, start: usize, count: usize) -> String {
        let mut s = format!("Memory [{}]:", start);
        let end = start.saturating_add(count).min(self.cells.len());
        for addr in start.min(end)..end {
            if addr == self.ptr {
                s.push_str(&format!(" [{:02X}]", self.cells[addr]));
            } else {
                s.push_str(&format!(" {:02X}", self.cells[addr]));
            }
        }
        s
    }
}
