use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Opcode {
    /// Return from the function. Terminal, but not a branch: it never picks a successor.
    Ret,

    /// Two-way conditional branch when it has two successors, plain jump when it has one. The
    /// 0-index successor is the taken successor.
    Br,

    /// Multi-way branch over an integer. Successor 0 is the default destination, the rest are
    /// the cases in declaration order. Several cases may lead to the same block.
    Switch,

    /// Branch through a computed address to one of the listed possible destinations.
    IndirectBr,

    /// Call with an exceptional edge. Terminal but not part of the branch family.
    Invoke,
    Resume,
    /// This is a terminal that indicates that we will never get here.
    Unreachable,
    CleanupRet,
    CatchRet,
    CatchSwitch,
    CallBr,

    /// Unary float negation.
    FNeg,

    /// Integer math.
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    Shl,
    /// Logical Shift.
    LShr,
    /// Arithmetic Shift.
    AShr,
    And,
    Or,
    Xor,

    /// Floating point math.
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,

    /// Stack allocation in the current frame.
    Alloca,
    Load,
    Store,
    /// Address arithmetic over an aggregate or pointer. Never touches memory itself, but
    /// counted with memory traffic since it only exists to feed loads and stores.
    GetElementPtr,
    Fence,
    AtomicCmpXchg,
    AtomicRMW,

    /// Casts and such.
    Trunc,
    ZExt,
    SExt,
    FPToUI,
    FPToSI,
    UIToFP,
    SIToFP,
    FPTrunc,
    FPExt,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,

    /// Integer comparison. Returns i1.
    ICmp,
    /// Floating point comparison, ordered or unordered. Returns i1.
    FCmp,

    Phi,
    Call,
    Select,
    VAArg,
    LandingPad,
    CleanupPad,
    CatchPad,
    Freeze,

    /// Vector and aggregate lane shuffling.
    ExtractElement,
    InsertElement,
    ShuffleVector,
    ExtractValue,
    InsertValue,
}

impl Opcode {
    pub const ALL: [Opcode; 65] = {
        use Opcode::*;
        [
            Ret, Br, Switch, IndirectBr, Invoke, Resume, Unreachable, CleanupRet, CatchRet,
            CatchSwitch, CallBr, FNeg, Add, Sub, Mul, UDiv, SDiv, URem, SRem, Shl, LShr, AShr,
            And, Or, Xor, FAdd, FSub, FMul, FDiv, FRem, Alloca, Load, Store, GetElementPtr,
            Fence, AtomicCmpXchg, AtomicRMW, Trunc, ZExt, SExt, FPToUI, FPToSI, UIToFP, SIToFP,
            FPTrunc, FPExt, PtrToInt, IntToPtr, BitCast, AddrSpaceCast, ICmp, FCmp, Phi, Call,
            Select, VAArg, LandingPad, CleanupPad, CatchPad, Freeze, ExtractElement,
            InsertElement, ShuffleVector, ExtractValue, InsertValue,
        ]
    };

    /// Opcodes whose successor choice is subject to the bias rule.
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Br | Self::Switch | Self::IndirectBr)
    }

    pub const fn is_terminator(self) -> bool {
        matches!(
            self,
            Self::Ret
                | Self::Br
                | Self::Switch
                | Self::IndirectBr
                | Self::Invoke
                | Self::Resume
                | Self::Unreachable
                | Self::CleanupRet
                | Self::CatchRet
                | Self::CatchSwitch
                | Self::CallBr
        )
    }

    pub const fn is_int_alu(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Add | Sub | Mul | UDiv | SDiv | URem | SRem | Shl | LShr | AShr | And | Or | Xor | ICmp
        )
    }

    pub const fn is_float_alu(self) -> bool {
        matches!(
            self,
            Self::FAdd | Self::FSub | Self::FMul | Self::FDiv | Self::FRem | Self::FCmp
        )
    }

    pub const fn is_atomic(self) -> bool {
        matches!(self, Self::AtomicCmpXchg | Self::AtomicRMW)
    }

    pub const fn is_memory_access(self) -> bool {
        matches!(
            self,
            Self::Alloca | Self::Load | Self::Store | Self::GetElementPtr | Self::Fence
        ) || self.is_atomic()
    }

    /// Lowercase mnemonic as it appears in textual IR.
    pub const fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            Ret => "ret",
            Br => "br",
            Switch => "switch",
            IndirectBr => "indirectbr",
            Invoke => "invoke",
            Resume => "resume",
            Unreachable => "unreachable",
            CleanupRet => "cleanupret",
            CatchRet => "catchret",
            CatchSwitch => "catchswitch",
            CallBr => "callbr",
            FNeg => "fneg",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            UDiv => "udiv",
            SDiv => "sdiv",
            URem => "urem",
            SRem => "srem",
            Shl => "shl",
            LShr => "lshr",
            AShr => "ashr",
            And => "and",
            Or => "or",
            Xor => "xor",
            FAdd => "fadd",
            FSub => "fsub",
            FMul => "fmul",
            FDiv => "fdiv",
            FRem => "frem",
            Alloca => "alloca",
            Load => "load",
            Store => "store",
            GetElementPtr => "getelementptr",
            Fence => "fence",
            AtomicCmpXchg => "cmpxchg",
            AtomicRMW => "atomicrmw",
            Trunc => "trunc",
            ZExt => "zext",
            SExt => "sext",
            FPToUI => "fptoui",
            FPToSI => "fptosi",
            UIToFP => "uitofp",
            SIToFP => "sitofp",
            FPTrunc => "fptrunc",
            FPExt => "fpext",
            PtrToInt => "ptrtoint",
            IntToPtr => "inttoptr",
            BitCast => "bitcast",
            AddrSpaceCast => "addrspacecast",
            ICmp => "icmp",
            FCmp => "fcmp",
            Phi => "phi",
            Call => "call",
            Select => "select",
            VAArg => "va_arg",
            LandingPad => "landingpad",
            CleanupPad => "cleanuppad",
            CatchPad => "catchpad",
            Freeze => "freeze",
            ExtractElement => "extractelement",
            InsertElement => "insertelement",
            ShuffleVector => "shufflevector",
            ExtractValue => "extractvalue",
            InsertValue => "insertvalue",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown opcode `{0}`")]
pub struct UnknownOpcode(pub String);

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOpcode(s.to_string()))
    }
}
