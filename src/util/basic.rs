// The app-wide error convention. Errors are rendered for the operator
// as soon as they are created, so a plain string carries everything
// we need.
pub type SError = String;
