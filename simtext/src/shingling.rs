/// Windows of `window_size` tokens, advanced by `step` tokens at a time.
pub struct ShingleIter<'a, T> {
    tokens: &'a [T],
    window_size: usize,
    step: usize,
    position: usize,
}

impl<'a, T> ShingleIter<'a, T> {
    pub fn new(tokens: &'a [T], window_size: usize, step: usize) -> Self {
        debug_assert!(window_size >= 1 && step >= 1);
        Self {
            tokens,
            window_size,
            step,
            position: 0,
        }
    }
}

impl<'a, T> Iterator for ShingleIter<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.tokens.len() < self.position + self.window_size {
            return None;
        }
        let window = &self.tokens[self.position..self.position + self.window_size];
        self.position += self.step;
        Some(window)
    }
}
