#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    CycleSort,
    SelectNext,
    SelectPrevious,
    None,
}
