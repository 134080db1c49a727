use super::tree::{Else, ElseIf, EndFor, EndIf, Node};

/// One piece of a block body, as returned while collecting nodes.
///
/// A body is a run of [`Node`] values ended by whichever closing or
/// branching tag is legal for the surrounding
/// [`Context`][`super::state::Context`].
pub enum Fragment {
    /// A regular node belonging to the body.
    Node(Node),
    /// An `endfor` tag ending a loop body.
    EndFor(EndFor),
    /// An `elseif` tag ending a branch.
    ///
    /// The tag and its condition are fully parsed, the body is empty
    /// and filled in by the caller.
    ElseIf(ElseIf),
    /// An `else` tag ending a branch, its body likewise still empty.
    Else(Else),
    /// An `endif` tag ending a conditional.
    EndIf(EndIf),
}
