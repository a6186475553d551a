pub const STATEMENT_COLOUR: u16 = 230;
pub const HEADER_COLOUR: u16 = 120;
pub const HAT_COLOUR: u16 = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Statement {
        code: String,
    },
    Header {
        header: String,
        body: Option<Box<Block>>,
    },
    Hat {
        body: Option<Box<Block>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub colour: Option<u16>,
    pub next: Option<Box<Block>>,
}

impl Block {
    pub fn statement(code: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Statement { code: code.into() },
            colour: None,
            next: None,
        }
    }

    pub fn header(header: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Header {
                header: header.into(),
                body: None,
            },
            colour: None,
            next: None,
        }
    }

    pub fn hat() -> Self {
        Self {
            kind: BlockKind::Hat { body: None },
            colour: None,
            next: None,
        }
    }

    pub fn is_hat(&self) -> bool {
        matches!(self.kind, BlockKind::Hat { .. })
    }

    pub fn body(&self) -> Option<&Block> {
        match &self.kind {
            BlockKind::Statement { .. } => None,
            BlockKind::Header { body, .. } | BlockKind::Hat { body } => body.as_deref(),
        }
    }

    pub fn body_slot_mut(&mut self) -> Option<&mut Option<Box<Block>>> {
        match &mut self.kind {
            BlockKind::Statement { .. } => None,
            BlockKind::Header { body, .. } | BlockKind::Hat { body } => Some(body),
        }
    }

    pub fn default_colour(&self) -> u16 {
        match self.kind {
            BlockKind::Statement { .. } => STATEMENT_COLOUR,
            BlockKind::Header { .. } => HEADER_COLOUR,
            BlockKind::Hat { .. } => HAT_COLOUR,
        }
    }

    pub fn effective_colour(&self) -> u16 {
        self.colour.unwrap_or_else(|| self.default_colour())
    }

    pub fn set_colour(&mut self, colour: u16) {
        self.colour = Some(colour);
    }

    pub fn reset_colour(&mut self) {
        self.colour = None;
    }

    pub fn siblings(&self) -> SiblingIter<'_> {
        SiblingIter {
            current: Some(self),
        }
    }

    fn count(&self) -> usize {
        let mut total = 0;
        for block in self.siblings() {
            total += 1;
            if let Some(body) = block.body() {
                total += body.count();
            }
        }
        total
    }
}

// Each non-root block is owned by exactly one slot: either a container's body
// or the previous sibling's `next`. Appending walks to the chain tail so
// insertion order is preserved.
pub fn append_to_chain(chain: &mut Option<Box<Block>>, block: Block) {
    match chain {
        Some(existing) => append_to_chain(&mut existing.next, block),
        None => *chain = Some(Box::new(block)),
    }
}

pub struct SiblingIter<'a> {
    current: Option<&'a Block>,
}

impl<'a> Iterator for SiblingIter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.current?;
        self.current = block.next.as_deref();
        Some(block)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    top_blocks: Vec<Block>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_top_block(&mut self, block: Block) {
        self.top_blocks.push(block);
    }

    pub fn top_blocks(&self) -> &[Block] {
        &self.top_blocks
    }

    pub fn top_blocks_mut(&mut self) -> &mut [Block] {
        &mut self.top_blocks
    }

    pub fn hats(&self) -> impl Iterator<Item = &Block> {
        self.top_blocks.iter().filter(|b| b.is_hat())
    }

    pub fn is_empty(&self) -> bool {
        self.top_blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.top_blocks.clear();
    }

    pub fn block_count(&self) -> usize {
        self.top_blocks.iter().map(Block::count).sum()
    }
}
