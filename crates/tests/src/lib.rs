
#[cfg(test)]
mod workspace_tests;
#[cfg(test)]
mod invite_tests;
#[cfg(test)]
mod ownership_tests;
