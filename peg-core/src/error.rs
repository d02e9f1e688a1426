/// Invalid board shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board side must be odd, got {0}")]
    EvenSide(usize),

    #[error("short edge must be at least 1")]
    ZeroShortEdge,

    #[error("board side {side} leaves no corners to cut for short edge {short_edge}")]
    SideTooSmall { side: usize, short_edge: usize },

    #[error("board side {side} exceeds the maximum of {max}")]
    SideTooLarge { side: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::EvenSide(8).to_string(),
            "board side must be odd, got 8"
        );
        assert_eq!(
            ConfigError::SideTooSmall { side: 5, short_edge: 4 }.to_string(),
            "board side 5 leaves no corners to cut for short edge 4"
        );
    }
}
