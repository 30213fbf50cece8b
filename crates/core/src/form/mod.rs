use serde::Serialize;

pub const SLOT_COUNT: usize = 10;

/// The ten ticker inputs of the form, addressed by position.
///
/// Slot text is stored exactly as typed; trimming happens on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SymbolList {
    slots: [String; SLOT_COUNT],
}

impl SymbolList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_symbols<I, S>(symbols: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for (index, symbol) in symbols.into_iter().enumerate() {
            anyhow::ensure!(
                index < SLOT_COUNT,
                "at most {SLOT_COUNT} stock symbols can be entered"
            );
            list.slots[index] = symbol.into();
        }
        Ok(list)
    }

    pub fn set(&mut self, index: usize, text: impl Into<String>) -> anyhow::Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| anyhow::anyhow!("slot index out of range: {index}"))?;
        *slot = text.into();
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> anyhow::Result<()> {
        self.set(index, String::new())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    /// Trimmed, non-empty slot texts in slot order.
    pub fn non_empty_trimmed(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Every slot trimmed, blanks included.
    pub fn trimmed_all(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.trim().to_string()).collect()
    }
}
